//! `meridian`: a small demo binary around `meridian-core`. Wires the
//! "hello graph" scenario (a ticking producer feeding a collecting sink)
//! and runs it to completion, or writes out a starter config file.

mod config;

use std::{path::PathBuf, thread, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::MeridianConfig;
use meridian_core::{
	node::NodeSpec,
	observability::Observability,
	port::PortSpec,
	scheduler::Scheduler,
	subgraph::{ConnectOptions, Subgraph},
};
use meridian_nodes::{Collector, Ticker};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
	/// Run the hello-graph demo to completion.
	Run {
		/// Path to a TOML config file. Defaults to built-in settings if
		/// omitted.
		#[arg(long)]
		config: Option<PathBuf>,

		/// How many values the demo's ticker emits before going quiet.
		#[arg(long, default_value_t = 10)]
		count: u64,
	},
	/// Write the shipped default config to `path`.
	InitConfig { path: PathBuf },
}

fn main() -> Result<()> {
	let cli = Args::parse();

	match cli.command {
		Commands::Run { config, count } => run(config, count),
		Commands::InitConfig { path } => MeridianConfig::create_default_config(&path),
	}
}

fn run(config_path: Option<PathBuf>, count: u64) -> Result<()> {
	let config = match config_path {
		Some(path) => MeridianConfig::load_from_file(&path)?,
		None => MeridianConfig::default(),
	};

	tracing_subscriber::fmt()
		.with_env_filter(config.logging.to_env_filter())
		.without_time()
		.with_ansi(true)
		.init();

	let (collector, sink) = Collector::<u64>::new();

	let mut graph = Subgraph::new();
	graph.add_node(NodeSpec::new("ticker", Ticker::new(count)).output(PortSpec::any("out")))?;
	graph.add_node(NodeSpec::new("collector", collector).input(PortSpec::any("in")))?;
	graph.connect(("ticker", "out"), ("collector", "in"), ConnectOptions::default());

	let tick_interval_ms = config.scheduler.tick_interval_ms;
	let mut scheduler = Scheduler::new(config.scheduler, Observability::noop()).register(graph)?;

	// The ticker keeps ticking (as a no-op) once it's done emitting, so the
	// graph never goes idle on its own; request shutdown explicitly once
	// it's had time to emit everything.
	let shutdown = scheduler.shutdown_handle();
	thread::spawn(move || {
		thread::sleep(Duration::from_millis(tick_interval_ms * (count + 2)));
		shutdown.shutdown();
	});

	scheduler.run()?;

	let collected = sink.lock().expect("collector sink poisoned");
	println!("collected {} values: {:?}", collected.len(), *collected);

	Ok(())
}
