fn main() {
    if let Err(e) = envsetup::run_cli() {
        if envsetup::should_report(&e) {
            eprintln!("{e}");
        }
        std::process::exit(envsetup::exit_code(&e));
    }
}
