//! Episode tracing tool
//!
//! Steps a perception results file frame by frame and prints every Start/End
//! edge of the built-in conditions, published or not. Useful for tuning
//! thresholds against recorded data.
//!
//! Usage:
//!   trace_episodes <perception_results.txt> [--fps <n>] [--limit <frames>]
//!
//! Example:
//!   trace_episodes perception_results.txt --fps 20 --limit 500

use perception_decoder::{
    Condition, DecoderConfig, DelimitedFrameSource, EyesClosedCondition, FrameSource,
    LookingAwayCondition, Schema, TimeBase, Transition,
};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

struct EpisodeStats {
    episodes: usize,
    published: usize,
    longest: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <perception_results.txt> [--fps <n>] [--limit <frames>]", args[0]);
        std::process::exit(1);
    }

    let input = PathBuf::from(&args[1]);
    let mut config = DecoderConfig::new();
    let mut limit: Option<u64> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--fps" => {
                i += 1;
                if i < args.len() {
                    config.frames_per_second = args[i].parse()?;
                }
            }
            "--limit" => {
                i += 1;
                if i < args.len() {
                    limit = Some(args[i].parse()?);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }
    config.validate()?;

    println!("=== Episode Trace ===");
    println!("Input: {:?}", input);
    println!("Frame rate: {} fps", config.frames_per_second);
    println!();

    let mut source = DelimitedFrameSource::open_with_config(&input, Schema::perception(), &config)?;
    let time_base = TimeBase::new(config.frames_per_second)?;
    let mut conditions: Vec<Box<dyn Condition>> = vec![
        Box::new(EyesClosedCondition::from_config(&config.eyes_closed)),
        Box::new(LookingAwayCondition::from_config(&config.looking_away)),
    ];
    let mut stats: HashMap<String, EpisodeStats> = HashMap::new();

    let mut frame = 0u64;
    while source.read_next_frame()? {
        if limit.is_some_and(|max| frame >= max) {
            println!("\n... (limit of {} frames reached)", frame);
            break;
        }

        let time = time_base.time_of(frame);
        for condition in conditions.iter_mut() {
            match condition.check(&source, time)? {
                Transition::Start => {
                    println!("[{:>8.2}s] {:<14} START", time, condition.name());
                }
                Transition::End => {
                    let published = condition.should_notify();
                    println!(
                        "[{:>8.2}s] {:<14} END   {:.2}s{}",
                        time,
                        condition.name(),
                        condition.duration(),
                        if published { "  -> published" } else { "" }
                    );

                    let entry = stats
                        .entry(condition.name().to_string())
                        .or_insert(EpisodeStats {
                            episodes: 0,
                            published: 0,
                            longest: 0.0,
                        });
                    entry.episodes += 1;
                    entry.published += published as usize;
                    entry.longest = entry.longest.max(condition.duration());
                }
                Transition::NoChange => {}
            }
        }
        frame += 1;
    }

    println!("\n=== SUMMARY ===");
    println!("Frames: {} ({:.2}s)", frame, time_base.time_of(frame));
    for condition in &conditions {
        match stats.get(condition.name()) {
            Some(s) => println!(
                "{}: {} episode(s), {} published, longest {:.2}s",
                condition.name(),
                s.episodes,
                s.published,
                s.longest
            ),
            None => println!("{}: no completed episodes", condition.name()),
        }
        if condition.is_active() {
            println!("  (still active since {:.2}s)", condition.start_time());
        }
    }

    Ok(())
}
