use clap::Parser;
use eyre::{Result, WrapErr};
use health_economy_core::{Population, PopulationConfig};
use tracing::*;
use tracing_subscriber::{prelude::*, EnvFilter};

#[inline]
pub fn run() -> Result<()> {
    App::parse().run()
}

/// Simulate a small healthcare economy for a number of days
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct App {
    /// Days to simulate
    #[arg(long, env = "HEALTH_ECONOMY_DAYS", default_value_t = 6,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub days: u32,

    #[arg(long, env = "HEALTH_ECONOMY_AMBULANCES", default_value_t = 2,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub ambulances: u32,

    #[arg(long, env = "HEALTH_ECONOMY_SUPPLIERS", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub suppliers: u32,

    #[arg(long, env = "HEALTH_ECONOMY_CLINICS", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub clinics: u32,

    #[arg(long, env = "HEALTH_ECONOMY_HOSPITALS", default_value_t = 2,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub hospitals: u32,

    /// Master seed for every actor's random choices
    #[arg(long, env = "HEALTH_ECONOMY_SEED", default_value_t = 12345)]
    pub seed: u64,

    /// Print the final report as JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl App {
    pub fn run(self) -> Result<()> {
        self.init_tracing();

        let config = self.population_config();
        info!(?config, "starting simulation");

        let report = Population::run(&config).wrap_err("simulation failed")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{report}");
        }

        if !report.funds_balanced() || !report.patients_balanced() {
            eyre::bail!("conservation check failed");
        }
        Ok(())
    }

    fn population_config(&self) -> PopulationConfig {
        PopulationConfig {
            days: self.days as usize,
            ambulances: self.ambulances as usize,
            suppliers: self.suppliers as usize,
            clinics: self.clinics as usize,
            hospitals: self.hospitals as usize,
            seed: self.seed,
        }
    }

    fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // stdout carries the report
        let main_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(main_layer.with_filter(filter))
            .init();
    }
}
