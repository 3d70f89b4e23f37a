use std::fmt::Write as _;
use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::app::App;
use crate::calendar::DayDate;
use crate::store::{Note, NoteId, NoteStore};

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Day the note belongs to, e.g. 2024-3-15 (defaults to today)
    #[arg(long)]
    pub date: Option<String>,
    /// Note text (prompted if omitted)
    #[arg()]
    pub title: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Only notes on this day, e.g. 2024-3-15
    #[arg(long, conflicts_with = "month")]
    pub date: Option<String>,
    /// Only notes in this month, e.g. 2024-3
    #[arg(long)]
    pub month: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RemoveArgs {
    /// Id of the note to remove (as printed by `list`)
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct ClearArgs {
    /// Day to clear, e.g. 2024-3-15
    pub date: String,
}

pub fn run_tui(app: &mut App) -> Result<()> {
    app.run()
}

pub fn add_note(mut store: NoteStore, args: AddArgs) -> Result<()> {
    let date = match &args.date {
        Some(raw) => raw
            .parse::<DayDate>()
            .with_context(|| format!("parsing date '{raw}'"))?,
        None => DayDate::today(),
    };
    let title = if args.title.is_empty() {
        prompt("Title")?
    } else {
        args.title.join(" ")
    };
    let title = title.trim();
    if title.is_empty() {
        bail!("note title cannot be empty");
    }

    let id = store.add(date, title).context("adding note")?;
    println!("Added note {id} on {date}");
    Ok(())
}

pub fn list_notes(store: &NoteStore, args: ListArgs) -> Result<()> {
    let filter = ListFilter::from_args(&args)?;
    print!("{}", format_note_list(store.notes(), &filter));
    Ok(())
}

pub fn remove_note(mut store: NoteStore, args: RemoveArgs) -> Result<()> {
    let id: NoteId = args
        .id
        .parse()
        .with_context(|| format!("parsing note id '{}'", args.id))?;
    if store.remove(id).context("removing note")? {
        println!("Removed note {id}");
    } else {
        bail!("no note with id {id}");
    }
    Ok(())
}

pub fn clear_day(mut store: NoteStore, args: ClearArgs) -> Result<()> {
    let date: DayDate = args
        .date
        .parse()
        .with_context(|| format!("parsing date '{}'", args.date))?;
    let removed = store.clear_day(date).context("clearing day")?;
    let plural = if removed == 1 { "" } else { "s" };
    println!("Removed {removed} note{plural} from {date}");
    Ok(())
}

enum ListFilter {
    All,
    Day(DayDate),
    Month { year: i32, month: u8 },
}

impl ListFilter {
    fn from_args(args: &ListArgs) -> Result<Self> {
        if let Some(raw) = &args.date {
            let date = raw
                .parse::<DayDate>()
                .with_context(|| format!("parsing date '{raw}'"))?;
            return Ok(Self::Day(date));
        }
        if let Some(raw) = &args.month {
            let mut parts = raw.trim().splitn(2, '-');
            let year = parts.next().and_then(|p| p.parse::<i32>().ok());
            let month = parts.next().and_then(|p| p.parse::<u8>().ok());
            let (Some(year), Some(month @ 1..=12)) = (year, month) else {
                bail!("expected a month shaped like 2024-3, got '{raw}'");
            };
            return Ok(Self::Month { year, month });
        }
        Ok(Self::All)
    }

    fn matches(&self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::Day(date) => note.date == *date,
            Self::Month { year, month } => {
                note.date.year() == *year && note.date.month() == *month
            }
        }
    }
}

fn format_note_list(notes: &[Note], filter: &ListFilter) -> String {
    let mut selected: Vec<&Note> = notes.iter().filter(|note| filter.matches(note)).collect();
    if selected.is_empty() {
        return "No notes found.\n".to_string();
    }
    selected.sort_by_key(|note| note.date);

    let mut out = String::new();
    let mut current_day: Option<DayDate> = None;
    for note in selected {
        if current_day != Some(note.date) {
            let _ = writeln!(&mut out, "{}", note.date);
            current_day = Some(note.date);
        }
        let _ = writeln!(&mut out, "  {}  {}", note.id, note.title);
    }
    out
}

fn prompt(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}: ", label)?;
    stdout.flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end().to_owned())
}
