fn main() {
    if let Err(err) = calnote::cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
