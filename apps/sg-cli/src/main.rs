use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use sg_secondary::{
    DrainTrigger, HeatupRecord, HeatupScenario, SecondaryConfig, SecondaryModel, run_ensemble,
    run_heatup,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "sg-cli")]
#[command(about = "Steam generator secondary-side heatup simulator", long_about = None)]
struct Cli {
    /// Model configuration YAML (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single heatup scenario
    Heatup {
        /// Scenario YAML; flags below override its values
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// Primary temperature at the end of the ramp (F)
        #[arg(long)]
        final_temp: Option<f64>,
        /// Ramp duration (hours)
        #[arg(long)]
        ramp_hr: Option<f64>,
        /// Hold duration after the ramp (hours)
        #[arg(long)]
        hold_hr: Option<f64>,
        /// Time step (seconds)
        #[arg(long)]
        dt: Option<f64>,
        /// Reactor coolant pumps running
        #[arg(long)]
        pumps: Option<u32>,
        /// Run with the steam line isolated
        #[arg(long)]
        no_sink: bool,
        /// Start draining at this time (seconds)
        #[arg(long)]
        drain_at: Option<f64>,
        /// Rows in the trend table (table format only)
        #[arg(long, default_value_t = 20)]
        rows: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the default scenario for several pump counts in parallel
    Sweep {
        /// Pump counts to compare
        #[arg(long, value_delimiter = ',', default_value = "1,2,3,4")]
        pumps: Vec<u32>,
        /// Primary temperature at the end of the ramp (F)
        #[arg(long, default_value_t = 560.0)]
        final_temp: f64,
        /// Ramp duration (hours)
        #[arg(long, default_value_t = 9.0)]
        ramp_hr: f64,
        /// Hold duration after the ramp (hours)
        #[arg(long, default_value_t = 1.0)]
        hold_hr: f64,
    },
    /// Print the effective model configuration as YAML
    Config {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Summary,
    Json,
    Csv,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Heatup {
            scenario,
            final_temp,
            ramp_hr,
            hold_hr,
            dt,
            pumps,
            no_sink,
            drain_at,
            rows,
            format,
            output,
        } => {
            let mut s = match scenario {
                Some(path) => serde_yaml::from_str(&std::fs::read_to_string(path)?)?,
                None => HeatupScenario::default(),
            };
            if let Some(v) = final_temp {
                s.final_primary_temp_f = v;
            }
            if let Some(v) = ramp_hr {
                s.ramp_hr = v;
            }
            if let Some(v) = hold_hr {
                s.hold_hr = v;
            }
            if let Some(v) = dt {
                s.dt_s = v;
            }
            if let Some(v) = pumps {
                s.pumps_running = v;
            }
            if no_sink {
                s.heat_sink_available = false;
            }
            if let Some(t) = drain_at {
                s.drain = Some(DrainTrigger::AtTime { time_s: t });
            }
            cmd_heatup(config, &s, format, rows, output.as_deref())
        }
        Commands::Sweep {
            pumps,
            final_temp,
            ramp_hr,
            hold_hr,
        } => cmd_sweep(config, &pumps, final_temp, ramp_hr, hold_hr),
        Commands::Config { output } => cmd_config(&config, output.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<SecondaryConfig> {
    match path {
        Some(p) => Ok(SecondaryConfig::load(p)?),
        None => Ok(SecondaryConfig::default()),
    }
}

fn cmd_heatup(
    config: SecondaryConfig,
    scenario: &HeatupScenario,
    format: OutputFormat,
    rows: usize,
    output: Option<&Path>,
) -> CliResult<()> {
    let model = SecondaryModel::from_config(config)?;
    let start = Instant::now();
    let record = run_heatup(&model, scenario)?;
    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "heatup complete"
    );

    let text = match format {
        OutputFormat::Table => {
            format!("{}\n{}", format_table(&record, rows), format_summary(&record))
        }
        OutputFormat::Summary => format_summary(&record),
        OutputFormat::Json => serde_json::to_string_pretty(&record)?,
        OutputFormat::Csv => format_csv(&record),
    };
    write_output(&text, output)
}

fn cmd_sweep(
    config: SecondaryConfig,
    pumps: &[u32],
    final_temp: f64,
    ramp_hr: f64,
    hold_hr: f64,
) -> CliResult<()> {
    let model = SecondaryModel::from_config(config)?;
    let scenarios: Vec<HeatupScenario> = pumps
        .iter()
        .map(|&n| HeatupScenario {
            name: format!("{n}_pumps"),
            pumps_running: n,
            final_primary_temp_f: final_temp,
            ramp_hr,
            hold_hr,
            ..HeatupScenario::default()
        })
        .collect();

    let start = Instant::now();
    let results = run_ensemble(&model, &scenarios);
    info!(
        runs = scenarios.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "sweep complete"
    );

    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "{:<16} {:>10} {:>12} {:>12} {:>14} {:>12}",
        "scenario", "regime", "P (psia)", "boil (hr)", "steam (lb)", "dump (hr)"
    )?;
    for (scenario, result) in scenarios.iter().zip(results) {
        match result {
            Ok(record) => {
                let s = &record.summary;
                writeln!(
                    stdout,
                    "{:<16} {:>10} {:>12.1} {:>12} {:>14.0} {:>12}",
                    record.name,
                    s.final_regime.as_str(),
                    s.final_pressure_psia,
                    hours(s.first_boiling_time_s),
                    s.cumulative_steam_lb,
                    hours(s.steam_dump_time_s),
                )?;
            }
            Err(e) => writeln!(stdout, "{:<16} failed: {}", scenario.name, e)?,
        }
    }
    Ok(())
}

fn cmd_config(config: &SecondaryConfig, output: Option<&Path>) -> CliResult<()> {
    write_output(&config.to_yaml_string()?, output)
}

fn hours(t_s: Option<f64>) -> String {
    match t_s {
        Some(t) => format!("{:.2}", t / 3600.0),
        None => "-".to_string(),
    }
}

fn format_table(record: &HeatupRecord, rows: usize) -> String {
    let mut out = format!(
        "{:>7} {:>10} {:>9} {:>8} {:>8} {:>8} {:>9} {:>10} {:>7}\n",
        "t (hr)", "regime", "P (psia)", "Tp (F)", "top (F)", "bot (F)", "Q (MW)", "steam", "WR %"
    );
    let stride = (record.snapshots.len() / rows.max(1)).max(1);
    let last = record.snapshots.len().saturating_sub(1);
    for (i, s) in record.snapshots.iter().enumerate() {
        if i % stride != 0 && i != last {
            continue;
        }
        out.push_str(&format!(
            "{:>7.2} {:>10} {:>9.1} {:>8.1} {:>8.1} {:>8.1} {:>9.2} {:>10.0} {:>7.1}\n",
            s.time_s / 3600.0,
            s.regime.as_str(),
            s.pressure_psia,
            s.primary_temp_f,
            s.top_temp_f,
            s.bottom_temp_f,
            s.heat_removal_mw,
            s.steam_production_lb_hr,
            s.wide_range_level_pct,
        ));
    }
    for t in &record.transitions {
        out.push_str(&format!(
            "  {:.2} hr: {} -> {} at {:.1} psia\n",
            t.time_s / 3600.0,
            t.from,
            t.to,
            t.pressure_psia
        ));
    }
    out
}

fn format_summary(record: &HeatupRecord) -> String {
    let s = &record.summary;
    let mut out = String::new();
    out.push_str(&format!("Scenario:          {}\n", record.name));
    out.push_str(&format!("Steps:             {}\n", s.steps));
    out.push_str(&format!("Boiling onset:     {} hr", hours(s.first_boiling_time_s)));
    if let Some(t) = s.first_boiling_top_temp_f {
        out.push_str(&format!(" (top node {t:.1} F)"));
    }
    out.push('\n');
    out.push_str(&format!("Steam dump:        {} hr\n", hours(s.steam_dump_time_s)));
    out.push_str(&format!("Drain complete:    {} hr\n", hours(s.drain_complete_time_s)));
    out.push_str(&format!("Final regime:      {}\n", s.final_regime));
    out.push_str(&format!("Final pressure:    {:.1} psia\n", s.final_pressure_psia));
    out.push_str(&format!("Final water mass:  {:.0} lb\n", s.final_water_mass_lb));
    out.push_str(&format!("Steam produced:    {:.0} lb\n", s.cumulative_steam_lb));
    out.push_str(&format!("Peak heat removal: {:.2} MW\n", s.max_heat_removal_mw));
    out.push_str(&format!(
        "Clamp engaged:     {} steps ({} bypassed)\n",
        s.clamp_engaged_steps, s.clamp_bypassed_steps
    ));
    out
}

fn format_csv(record: &HeatupRecord) -> String {
    let mut csv = String::from(
        "time_s,regime,pressure_psia,t_sat_f,top_temp_f,bottom_temp_f,heat_removal_mw,steam_lb_hr,water_mass_lb,thermocline_ft\n",
    );
    for s in &record.snapshots {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            s.time_s,
            s.regime,
            s.pressure_psia,
            s.saturation_temp_f,
            s.top_temp_f,
            s.bottom_temp_f,
            s.heat_removal_mw,
            s.steam_production_lb_hr,
            s.water_mass_lb,
            s.thermocline_height_ft,
        ));
    }
    csv
}

fn write_output(text: &str, output: Option<&Path>) -> CliResult<()> {
    if let Some(path) = output {
        std::fs::write(path, text)?;
        println!("Wrote {}", path.display());
    } else {
        print!("{text}");
    }
    Ok(())
}
