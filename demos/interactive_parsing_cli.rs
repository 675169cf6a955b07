use clap::{Arg, Command};
use logistics_nlu_lib::LogisticsNluEngine;
use std::io;
use std::io::Write;

fn main() {
    env_logger::Builder::from_default_env()
        .format_timestamp_nanos()
        .init();

    let matches = Command::new("logistics-nlu-parse")
        .about("Interactive CLI for parsing logistics queries")
        .arg(
            Arg::new("NLU_ENGINE_DIR")
                .required(true)
                .index(1)
                .help("path to the trained nlu engine directory"),
        )
        .get_matches();
    let engine_dir = matches.get_one::<String>("NLU_ENGINE_DIR").unwrap();

    println!("\nLoading the nlu engine...");
    let engine = LogisticsNluEngine::from_path(engine_dir).unwrap();

    loop {
        print!("> ");
        io::stdout().flush().unwrap();
        let mut query = String::new();
        if io::stdin().read_line(&mut query).unwrap() == 0 {
            break;
        }
        if query.trim().is_empty() {
            continue;
        }
        let result = engine.parse(query.trim(), None).unwrap();
        let result_json = serde_json::to_string_pretty(&result).unwrap();
        println!("{}", result_json);
    }
}
