fn main() {
    if let Err(err) = storyflow::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
