fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    if let Err(e) = prepmate_lib::run() {
        eprintln!("Error running application: {}", e);
        std::process::exit(1);
    }
}
