use mimalloc::MiMalloc;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use lemma_vectors::pipeline::pipeline::LemmaPipeline;

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Config {
    vectors_path: String,
    dictionary_path: String,
    output_path: String,
    max_vocab: usize,
    write_header: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            vectors_path: "data/wiki.multi.ru.vec".to_string(),
            dictionary_path: "data/morph_dictionary.tsv".to_string(),
            output_path: "wiki.multi.ru_lemmatized.vec".to_string(),
            max_vocab: 1_000_000,
            write_header: false,
        }
    }
}

fn load_config(path: &str) -> Config {
    if Path::new(path).exists() {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    println!("✓ Loaded configuration from {}", path);
                    return config;
                }
                Err(e) => {
                    eprintln!("⚠ Error parsing config.json: {}", e);
                    eprintln!("  Using default configuration");
                }
            },
            Err(e) => {
                eprintln!("⚠ Error reading config.json: {}", e);
                eprintln!("  Using default configuration");
            }
        }
    } else {
        println!("ℹ config.json not found, using default configuration");
    }

    Config::default()
}

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    let mut rl = DefaultEditor::new().unwrap();

    let config_path = "config.json";
    let config = load_config(config_path);

    println!("\nCurrent Configuration:");
    println!("  Vector File:        {}", config.vectors_path);
    println!("  Morph Dictionary:   {}", config.dictionary_path);
    println!("  Output File:        {}", config.output_path);
    println!("  Max Vocabulary:     {}", config.max_vocab);
    println!("  Write Header:       {}", config.write_header);
    println!("\nWelcome to my CLI! Type 'help' for commands or 'exit' to quit.\n");

    let max_vocab = if config.max_vocab == 0 {
        None
    } else {
        Some(config.max_vocab)
    };
    let mut pipeline = LemmaPipeline::new(
        config.vectors_path,
        config.dictionary_path,
        config.output_path,
        max_vocab,
        config.write_header,
    )
    .unwrap();

    loop {
        let readline = rl.readline("> ");

        match readline {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let parts: Vec<&str> = line.split_whitespace().collect();
                let command = parts[0];

                match command {
                    "help" => {
                        println!("The valid commands are->");
                        println!("run: Runs the whole pipeline, load through write");
                        println!("load: Loads the vector file into memory");
                        println!("group: Buckets the loaded tokens by lemma");
                        println!("average: Averages each lemma bucket into one vector");
                        println!("write: Writes the averaged vectors to the output file");
                        println!("stats: Shows the current vocabulary and lemma counts");
                    }
                    "run" => {
                        let start_time = SystemTime::now();
                        pipeline.run().unwrap();
                        let end_time = SystemTime::now();
                        println!(
                            "The pipeline has completed in {} seconds",
                            end_time.duration_since(start_time).unwrap().as_secs()
                        );
                    }
                    "load" => {
                        let start_time = SystemTime::now();
                        pipeline.load().unwrap();
                        let end_time = SystemTime::now();
                        println!(
                            "The vectors have been successfully loaded in {} seconds",
                            end_time.duration_since(start_time).unwrap().as_secs()
                        );
                    }
                    "group" => {
                        pipeline.group().unwrap();
                        println!("The tokens have been grouped by lemma")
                    }
                    "average" => {
                        pipeline.average().unwrap();
                        println!("The lemma vectors have been averaged")
                    }
                    "write" => {
                        pipeline.write().unwrap();
                        println!("The lemma vectors have been written")
                    }
                    "stats" => match pipeline.stats() {
                        Some(stats) => {
                            println!("The size of the vocabulary is {:?}", stats.vocabulary_size);
                            println!(
                                "The dimensionality of the vectors is {:?}",
                                stats.dimensionality
                            );
                            println!(
                                "The number of distinct lemmas is {:?}",
                                stats.distinct_lemmas
                            );
                            println!(
                                "The largest lemma group has {:?} members",
                                stats.largest_group
                            );
                        }
                        None => {
                            println!("The vectors have not been loaded yet");
                        }
                    },
                    "quit" | "exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {
                        println!(
                            "Invalid command. Type help if you want to see the valid commands"
                        );
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
}
