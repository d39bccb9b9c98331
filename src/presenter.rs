use colored::*;

use crate::buffers::{HistoryPoint, LogEntry};
use crate::chemistry::{ChemistryState, LEVEL_MAX};
use crate::engine::EngineSnapshot;
use crate::recommendation::{Recommendation, RecommendationCategory};

const BAR_WIDTH: usize = 20;
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const PLACEHOLDER: &str = "WAITING_FOR_SYNC";

/// Terminal renderer for engine snapshots.
pub struct Presenter;

impl Presenter {
    pub fn render(snapshot: &EngineSnapshot) -> String {
        let status = if snapshot.running {
            "● LIVE".green().bold()
        } else {
            "○ IDLE".yellow().bold()
        };

        format!(
            r#"
╔══════════════════════════════════════════════════════════════╗
║                🧪 Chemistry Digital Twin                     ║
╚══════════════════════════════════════════════════════════════╝
{}  tick {}  session {}

{}
{}

{}
{}

{}
{}

{}
{}"#,
            status,
            snapshot.ticks,
            &snapshot.session_id.to_string()[..8],
            "Levels".cyan().bold(),
            Self::format_levels(&snapshot.state),
            "History".cyan().bold(),
            Self::format_history(&snapshot.history),
            "Event Log".cyan().bold(),
            Self::format_log(&snapshot.log),
            "Recommendations".cyan().bold(),
            Self::format_recommendations(&snapshot.recommendations),
        )
    }

    pub fn format_levels(state: &ChemistryState) -> String {
        state
            .levels()
            .iter()
            .map(|(name, value)| format!("{:<9} {} {:>5.1}", name, Self::format_bar(name, *value), value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_bar(name: &str, value: f64) -> String {
        let filled = Self::bar_cells(value);
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
        match name {
            "Dopamine" => bar.yellow().to_string(),
            "Oxytocin" => bar.magenta().to_string(),
            _ => bar.red().to_string(),
        }
    }

    pub fn bar_cells(value: f64) -> usize {
        let ratio = (value / LEVEL_MAX).clamp(0.0, 1.0);
        (ratio * BAR_WIDTH as f64).round() as usize
    }

    pub fn format_history(history: &[HistoryPoint]) -> String {
        if history.is_empty() {
            return PLACEHOLDER.dimmed().to_string();
        }

        let line = |pick: fn(&ChemistryState) -> f64| -> String {
            history.iter().map(|p| Self::spark(pick(&p.chemistry))).collect()
        };

        let first = history.first().map(|p| p.time.as_str()).unwrap_or_default();
        let last = history.last().map(|p| p.time.as_str()).unwrap_or_default();

        format!(
            "Dopamine  {}\nOxytocin  {}\nCortisol  {}\n          {} → {}",
            line(|s| s.dopamine).yellow(),
            line(|s| s.oxytocin).magenta(),
            line(|s| s.cortisol).red(),
            first,
            last
        )
    }

    pub fn spark(value: f64) -> char {
        let ratio = (value / LEVEL_MAX).clamp(0.0, 1.0);
        SPARKS[(ratio * (SPARKS.len() - 1) as f64).round() as usize]
    }

    pub fn format_log(log: &[LogEntry]) -> String {
        if log.is_empty() {
            return PLACEHOLDER.dimmed().to_string();
        }

        log.iter()
            .map(|entry| {
                let event = if entry.event.is_event() {
                    entry.event.label().bold().to_string()
                } else {
                    entry.event.label().dimmed().to_string()
                };
                format!(
                    "#{:<4} {}  {:<15} D {:>5.1}  O {:>5.1}  C {:>5.1}",
                    entry.id,
                    entry.timestamp,
                    event,
                    entry.snapshot.dopamine,
                    entry.snapshot.oxytocin,
                    entry.snapshot.cortisol
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_recommendations(recommendations: &[Recommendation]) -> String {
        recommendations
            .iter()
            .map(|rec| {
                let title = match rec.category {
                    RecommendationCategory::StressAlert => format!("⚠️  {}", rec.category).red(),
                    RecommendationCategory::BondingDeficit => {
                        format!("💔 {}", rec.category).magenta()
                    }
                    RecommendationCategory::LowReward => format!("📉 {}", rec.category).yellow(),
                    RecommendationCategory::Optimal => format!("✨ {}", rec.category).green(),
                };
                format!("┌ {}\n└ {}", title.bold(), rec.message)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
