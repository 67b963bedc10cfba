fn main() {
    if let Err(err) = pathgrid::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
