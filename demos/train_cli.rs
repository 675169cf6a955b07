use clap::{value_parser, Arg, Command};
use logistics_nlu_lib::load_shared_resources;
use logistics_nlu_lib::training::{train, Dataset, TrainingConfig};

fn main() {
    env_logger::Builder::from_default_env()
        .format_timestamp_nanos()
        .init();

    let matches = Command::new("logistics-nlu-train")
        .about("Train the logistics intent classifier and save a loadable engine")
        .arg(
            Arg::new("DATASET")
                .required(true)
                .index(1)
                .help("path to the text,intent csv dataset"),
        )
        .arg(
            Arg::new("RESOURCES_DIR")
                .required(true)
                .index(2)
                .help("path to the resources directory (gazetteers, stop words)"),
        )
        .arg(
            Arg::new("OUTPUT_DIR")
                .required(true)
                .index(3)
                .help("directory where the trained engine will be saved"),
        )
        .arg(
            Arg::new("epochs")
                .short('e')
                .long("epochs")
                .value_parser(value_parser!(usize))
                .help("number of gradient descent epochs"),
        )
        .arg(
            Arg::new("learning_rate")
                .short('l')
                .long("learning-rate")
                .value_parser(value_parser!(f32))
                .help("gradient descent learning rate"),
        )
        .get_matches();

    let dataset_path = matches.get_one::<String>("DATASET").unwrap();
    let resources_dir = matches.get_one::<String>("RESOURCES_DIR").unwrap();
    let output_dir = matches.get_one::<String>("OUTPUT_DIR").unwrap();

    let mut config = TrainingConfig::default();
    if let Some(epochs) = matches.get_one::<usize>("epochs") {
        config.epochs = *epochs;
    }
    if let Some(learning_rate) = matches.get_one::<f32>("learning_rate") {
        config.learning_rate = *learning_rate;
    }

    let dataset = Dataset::from_path(dataset_path).unwrap();
    println!(
        "Loaded {} utterances with {} intents",
        dataset.utterances.len(),
        dataset.intents().len()
    );

    let resources = load_shared_resources(resources_dir).unwrap();
    let trained = train(&dataset, resources, &config).unwrap();

    let metrics = trained.metrics();
    println!("Training accuracy: {:.2}", metrics.accuracy);
    let mut intents: Vec<_> = metrics.per_intent.iter().collect();
    intents.sort_by_key(|(intent, _)| intent.to_string());
    for (intent, intent_metrics) in intents {
        println!(
            "  {:<25} precision: {:.2}  recall: {:.2}  utterances: {}",
            intent,
            intent_metrics.precision,
            intent_metrics.recall,
            intent_metrics.nb_utterances
        );
    }

    trained.save(output_dir, resources_dir).unwrap();
    println!("Engine saved to {}", output_dir);
}
