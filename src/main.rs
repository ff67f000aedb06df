fn main() {
    if let Err(e) = tabletop::flow::run() {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
