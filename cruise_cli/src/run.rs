//! Backend assembly, script replay and the `run` / `self-check` commands.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use cruise_config::{Config, ScriptRow};
use cruise_core::error::{CruiseError, Result as CoreResult};
use cruise_core::{CruiseController, LatencyStats, RunOptions, RunSummary, Settings, TickReport};
use cruise_hardware::{SimCfg, SimHandles, SimRig};
use eyre::WrapErr;
use serde_json::json;

/// Controller plus the operator handles when running on the simulator.
pub struct Backend {
    pub controller: CruiseController,
    pub sim: Option<SimHandles>,
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn build_backend(cfg: &Config) -> CoreResult<Backend> {
    build_sim_backend(cfg)
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn build_backend(cfg: &Config) -> CoreResult<Backend> {
    use cruise_hardware::gpio::{GpioButton, GpioPulseSource, SoftPwm};
    use cruise_hardware::mcp3008::Mcp3008;

    let settings = hardware_settings(cfg)?;
    let pins = &cfg.pins;
    let button = GpioButton::new(pins.button).wrap_err("open button pin")?;
    let pot = Mcp3008::new(pins.pot_channel).wrap_err("open potentiometer adc")?;
    let pwm = SoftPwm::new(pins.motor_pwm, cfg.motor.pwm_frequency_hz, cfg.motor.max_duty)
        .wrap_err("open motor pwm pin")?;
    let sensor = GpioPulseSource::new(pins.sensor).wrap_err("open sensor pin")?;
    tracing::info!(
        sensor = pins.sensor,
        button = pins.button,
        motor_pwm = pins.motor_pwm,
        pot_channel = pins.pot_channel,
        "hardware backend"
    );

    let controller = CruiseController::builder()
        .with_button(button)
        .with_potentiometer(pot)
        .with_pwm(pwm)
        .with_pulse_source(sensor)
        .with_settings(settings)
        .build()?;
    Ok(Backend {
        controller,
        sim: None,
    })
}

/// Runtime settings for the MCP3008 knob; the configured full scale must match the ADC.
#[cfg_attr(not(all(feature = "hardware", target_os = "linux")), allow(dead_code))]
fn hardware_settings(cfg: &Config) -> CoreResult<Settings> {
    cruise_hardware::mcp3008::check_full_scale(cfg.potentiometer.raw_max)
        .map_err(|e| CruiseError::Config(e.to_string()))?;
    Ok(Settings::from(cfg))
}

#[cfg_attr(all(feature = "hardware", target_os = "linux"), allow(dead_code))]
pub fn build_sim_backend(cfg: &Config) -> CoreResult<Backend> {
    let (rig, handles) = SimRig::new(SimCfg {
        max_duty: cfg.motor.max_duty,
        max_rpm: cfg.simulation.max_rpm,
        pulses_per_rev: cfg.sensor.pulses_per_rev,
        initial_pot_raw: cfg.simulation.initial_pot_raw,
    });
    tracing::info!(
        max_rpm = cfg.simulation.max_rpm,
        initial_pot_raw = cfg.simulation.initial_pot_raw,
        "simulated backend"
    );
    let controller = CruiseController::builder()
        .with_button(rig.button)
        .with_potentiometer(rig.pot)
        .with_pwm(rig.pwm)
        .with_pulse_source(rig.pulses)
        .with_settings(Settings::from(cfg))
        .build()?;
    Ok(Backend {
        controller,
        sim: Some(handles),
    })
}

/// Apply script rows to the simulator at their offsets from `start`.
fn spawn_replay(
    rows: Vec<ScriptRow>,
    handles: SimHandles,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let start = Instant::now();
        for row in rows {
            let due = start + Duration::from_millis(row.at_ms);
            while Instant::now() < due {
                if shutdown.load(Ordering::Relaxed) {
                    return;
                }
                let left = due.saturating_duration_since(Instant::now());
                std::thread::sleep(left.min(Duration::from_millis(10)));
            }
            handles.set_button(row.button);
            handles.set_pot_raw(row.pot_raw);
            tracing::debug!(at_ms = row.at_ms, button = row.button, pot_raw = row.pot_raw, "script row");
        }
    })
}

/// Tick budget that covers the whole script plus one tick to observe the last row.
fn ticks_for_script(rows: &[ScriptRow], tick_ms: u64) -> u64 {
    let last = rows.last().map_or(0, |r| r.at_ms);
    last / tick_ms.max(1) + 2
}

pub struct RunArgs<'a> {
    pub ticks: Option<u64>,
    pub script: Option<&'a std::path::Path>,
    pub stats: bool,
    pub json: bool,
}

pub fn run_loop(cfg: &Config, args: &RunArgs<'_>, shutdown: Arc<AtomicBool>) -> CoreResult<RunSummary> {
    let rows = match args.script {
        Some(p) => Some(cruise_config::load_input_script(p)?),
        None => None,
    };

    let Backend {
        mut controller,
        sim,
    } = build_backend(cfg)?;

    let tick_ms = controller.settings().control.tick_ms;
    let mut max_ticks = args.ticks;
    let replay = match (rows, sim) {
        (Some(rows), Some(handles)) => {
            if max_ticks.is_none() {
                max_ticks = Some(ticks_for_script(&rows, tick_ms));
            }
            tracing::info!(rows = rows.len(), "replaying input script");
            Some(spawn_replay(rows, handles, Arc::clone(&shutdown)))
        }
        (Some(_), None) => eyre::bail!("--script requires the simulated backend"),
        (None, _) => None,
    };

    let opts = RunOptions {
        tick_ms: None,
        max_ticks,
        collect_stats: args.stats,
    };
    let json = args.json;
    let summary = cruise_core::run(&mut controller, &opts, &shutdown, |r| {
        if json {
            println!("{}", tick_json(r));
        }
    })
    .wrap_err("control loop")?;

    shutdown.store(true, Ordering::Relaxed);
    if let Some(h) = replay
        && h.join().is_err()
    {
        tracing::warn!("script replay thread panicked");
    }

    if args.stats {
        print_stats(&summary, tick_ms, json);
    }
    print_summary(&summary, json);
    Ok(summary)
}

pub fn self_check(cfg: &Config, json: bool) -> CoreResult<()> {
    let Backend { mut controller, .. } = build_backend(cfg)?;
    controller.begin();
    let report = controller.tick().wrap_err("self-check tick")?;
    controller.stop()?;
    if json {
        println!(
            "{}",
            json!({ "status": "ok", "cruise": report.cruise.as_str(), "duty": report.duty })
        );
    } else {
        println!("self-check ok");
    }
    Ok(())
}

fn source_name(r: &TickReport) -> &'static str {
    match r.source {
        cruise_core::SpeedSource::Measured => "measured",
        cruise_core::SpeedSource::Knob => "knob",
    }
}

fn tick_json(r: &TickReport) -> serde_json::Value {
    json!({
        "t_ms": r.now_ms,
        "rpm": r.speed.rpm,
        "speed_updated": r.speed_updated,
        "pot": r.pot.value,
        "cruise": r.cruise.as_str(),
        "source": source_name(r),
        "commanded": r.commanded_speed,
        "duty": r.duty,
    })
}

fn print_summary(s: &RunSummary, json: bool) {
    let last = s.last_report.as_ref();
    let cruise = last.map_or("inactive", |r| r.cruise.as_str());
    let rpm = last.map_or(0.0, |r| r.speed.rpm);
    let duty = last.map_or(0, |r| r.duty);
    if json {
        println!(
            "{}",
            json!({
                "ticks": s.ticks,
                "failed_ticks": s.failed_ticks,
                "overruns": s.overruns,
                "cruise": cruise,
                "rpm": rpm,
                "last_duty": duty,
            })
        );
    } else {
        println!(
            "run complete: ticks={} failed={} overruns={} cruise={cruise} rpm={rpm:.2} last_duty={duty}",
            s.ticks, s.failed_ticks, s.overruns
        );
    }
}

fn print_stats(s: &RunSummary, tick_ms: u64, json: bool) {
    let Some(LatencyStats {
        samples,
        min_us,
        max_us,
        mean_us,
        p95_us,
    }) = s.latency
    else {
        return;
    };
    if json {
        println!(
            "{}",
            json!({
                "stats": {
                    "samples": samples,
                    "tick_ms": tick_ms,
                    "min_us": min_us,
                    "max_us": max_us,
                    "mean_us": mean_us,
                    "p95_us": p95_us,
                    "overruns": s.overruns,
                }
            })
        );
    } else {
        println!(
            "stats: samples={samples} tick_ms={tick_ms} min_us={min_us} max_us={max_us} mean_us={mean_us:.1} p95_us={p95_us} overruns={}",
            s.overruns
        );
    }
}
