//! Built-in console host
//!
//! A lifecycle driver, not a simulation: it builds the colony with the
//! agent's constructor, feeds it ticks and sugar sightings, and reports what
//! the ants asked their capability objects to do. There is no renderer, so a
//! non-headless run traces progress to the terminal instead.

use colored::*;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use super::capability::{Colonist, SugarField};
use super::{HostError, HostRuntime, HostSettings};
use crate::config::HostConfig;
use crate::pipeline::RuntimeOption;

/// Upper bound on sugar piles the console host will place.
pub const MAX_SUGAR_PILES: u32 = 100_000;

/// What happened during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub ticks: u32,
    pub ants: u32,
    pub sugar_piles: u32,
    pub sugar_delivered: u64,
    pub sugar_remaining: u64,
    pub turns: u64,
    pub rotation: u64,
    pub distance: i64,
}

pub struct ConsoleHost {
    config: HostConfig,
    last_report: Option<RunReport>,
}

impl ConsoleHost {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            last_report: None,
        }
    }

    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    fn wait_for_start(&self) -> Result<(), HostError> {
        print!("{} Press Enter to start the simulation...", "→".blue());
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}

impl HostRuntime for ConsoleHost {
    fn run(&mut self, options: Vec<RuntimeOption>) -> Result<(), HostError> {
        let settings = HostSettings::from_options(options);
        let constructor = settings.constructor.ok_or(HostError::MissingConstructor)?;
        let piles = settings.desired_sugar.unwrap_or(self.config.default_sugar);
        if piles > MAX_SUGAR_PILES {
            return Err(HostError::TooManyPiles {
                requested: piles,
                max: MAX_SUGAR_PILES,
            });
        }

        log::info!(
            "Console host: {} ant(s), {} pile(s), {} tick(s), headless={}, immediate={}",
            self.config.colony_size,
            piles,
            self.config.ticks,
            settings.headless,
            settings.start_immediately
        );

        if !settings.headless {
            println!("  {} No renderer available, tracing to the console", "⚠".yellow());
        }
        if !settings.start_immediately {
            self.wait_for_start()?;
        }

        let field = Rc::new(SugarField::new(piles, self.config.sugar_per_pile));
        let mut colony: Vec<Colonist> = (0..self.config.colony_size)
            .map(|_| Colonist::spawn(&constructor, field.clone()))
            .collect();

        for tick in 0..self.config.ticks {
            step(&mut colony, &field, tick);

            if !settings.headless && (tick % self.config.trace_every.max(1) == 0 || tick + 1 == self.config.ticks) {
                let delivered: u64 = colony.iter().map(|c| u64::from(c.body().delivered())).sum();
                println!(
                    "  {} tick {:>5}  delivered {:>4}  remaining {:>4}",
                    "·".dimmed(),
                    tick,
                    delivered,
                    field.remaining()
                );
            }
        }

        let report = RunReport {
            ticks: self.config.ticks,
            ants: colony.len() as u32,
            sugar_piles: field.pile_count(),
            sugar_delivered: colony.iter().map(|c| u64::from(c.body().delivered())).sum(),
            sugar_remaining: field.remaining(),
            turns: colony.iter().fold(0u64, |acc, c| acc.saturating_add(c.body().turns())),
            rotation: colony.iter().fold(0u64, |acc, c| acc.saturating_add(c.body().rotation())),
            distance: colony.iter().fold(0i64, |acc, c| acc.saturating_add(c.body().distance())),
        };
        drop(colony);

        print_report(&report);
        self.last_report = Some(report);
        Ok(())
    }
}

/// Advance every ant by one tick.
fn step(colony: &mut [Colonist], field: &SugarField, tick: u32) {
    for colonist in colony.iter_mut() {
        colonist.agent().tick();

        let target = colonist.body().take_target();
        let carrying = colonist.body().load() > 0;
        match target {
            Some(sugar) => colonist.agent().reached_sugar(sugar),
            None => match field.visible(tick) {
                Some(sugar) if !carrying => colonist.agent().see_sugar(sugar),
                _ => colonist.agent().waits(),
            },
        }
    }
}

fn print_report(report: &RunReport) {
    println!();
    println!("{} Simulation finished after {} ticks", "✓".green().bold(), report.ticks);
    println!("  Ants:            {}", report.ants);
    println!(
        "  Sugar delivered: {} ({} left in {} pile(s))",
        report.sugar_delivered.to_string().green(),
        report.sugar_remaining,
        report.sugar_piles
    );
    println!("  Turns:           {} ({}° in total)", report.turns, report.rotation);
    println!("  Distance:        {}", report.distance);
}
