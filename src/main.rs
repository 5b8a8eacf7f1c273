use glossa::Cascade;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: glossa <text>");
        eprintln!();
        eprintln!("Prints the detected language code for the given text.");
        eprintln!("Model assets are read from $GLOSSA_MODEL_DIR (default: model_assets).");
        std::process::exit(1);
    }

    let model_dir =
        std::env::var("GLOSSA_MODEL_DIR").unwrap_or_else(|_| "model_assets".to_string());

    let cascade = Cascade::from_model_dir(&model_dir);

    match cascade.detect(&args[1]) {
        Ok(code) => println!("{}", code),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
