//! Sample a complete activity description
//!
//! Loads an activity library from a directory, draws one description
//! over a clip, prints a tree summary, and optionally writes the
//! realized trajectories as a plain-text data table.

use std::path::PathBuf;

use clap::Parser;

use activity_tree_model_rs::common::rng::SimpleRng;
use activity_tree_model_rs::gp::assemble_data;
use activity_tree_model_rs::io::write_data;
use activity_tree_model_rs::library::load_dir;
use activity_tree_model_rs::model::{Activity, Description, NodeId, TrajectorySet};
use activity_tree_model_rs::sampler::{DescriptionPrior, PriorConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the activity library tables
    #[arg(short, long)]
    library: PathBuf,

    /// Random seed for deterministic runs
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Number of individuals in the clip
    #[arg(short, long, default_value_t = 3)]
    individuals: usize,

    /// Number of frames in the clip
    #[arg(short, long, default_value_t = 100)]
    frames: usize,

    /// Write the realized trajectories to this data table
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn print_tree(desc: &Description, node: NodeId, indent: usize) {
    let Ok(activity) = desc.node(node) else {
        return;
    };
    println!(
        "{:indent$}{} [{}, {}] {{{}}}",
        "",
        activity.name(),
        activity.start(),
        activity.end(),
        activity
            .trajectories()
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        indent = indent
    );
    let Ok(children) = desc.children(node) else {
        return;
    };
    for seq_id in children {
        let Ok(seq) = desc.sequence(seq_id) else {
            continue;
        };
        println!("{:indent$}  role {}:", "", seq.role(), indent = indent);
        for &activity in seq.activities() {
            match activity {
                Activity::Intentional(child) => print_tree(desc, child, indent + 4),
                Activity::Physical(pid) => {
                    if let Ok(phys) = desc.physical(pid) {
                        println!(
                            "{:indent$}{} [{}, {}]",
                            "",
                            phys.name(),
                            phys.start(),
                            phys.end(),
                            indent = indent + 4
                        );
                    }
                }
            }
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.individuals == 0 || args.frames == 0 {
        eprintln!("need at least one individual and one frame");
        std::process::exit(1);
    }

    let library = match load_dir(&args.library) {
        Ok(library) => library,
        Err(err) => {
            eprintln!("failed to load library: {}", err);
            std::process::exit(1);
        }
    };

    println!("Activity Description Sampler");
    println!("============================");
    println!("Seed: {}", args.seed);
    println!("Individuals: {}", args.individuals);
    println!("Frames: {}", args.frames);
    println!(
        "Library: {} activities, {} roles",
        library.activities().len(),
        library.roles().len()
    );
    println!();

    let config = PriorConfig::default();
    let prior = DescriptionPrior::new(&library, config);
    let mut rng = SimpleRng::new(args.seed);
    let individuals = TrajectorySet::from_iter(0..args.individuals);

    let desc = match prior.sample(&mut rng, 0, args.frames - 1, individuals) {
        Ok(desc) => desc,
        Err(err) => {
            eprintln!("sampling failed: {}", err);
            std::process::exit(1);
        }
    };

    print_tree(&desc, desc.root(), 0);
    println!();
    println!(
        "{} nodes, {} sequences, {} physical activities",
        desc.num_nodes(),
        desc.num_sequences(),
        desc.num_physicals()
    );

    if let Some(output) = args.output {
        let data = match assemble_data(&desc, prior.config().dims) {
            Ok(data) => data,
            Err(err) => {
                eprintln!("failed to assemble data: {}", err);
                std::process::exit(1);
            }
        };
        if let Err(err) = write_data(&output, &data) {
            eprintln!("failed to write {}: {}", output.display(), err);
            std::process::exit(1);
        }
        println!("wrote {} trajectories to {}", data.len(), output.display());
    }
}
