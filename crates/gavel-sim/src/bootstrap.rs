//! Demo roster for a simulated run.

use gavel_roster::MemoryRoster;
use gavel_types::{Category, Player, Settings, Team, constants};
use rand::Rng;
use rand::seq::SliceRandom;

const SKILLS: &[&str] = &["Batter", "Bowler", "All-rounder", "Wicket-keeper"];
const COUNTRIES: &[&str] = &["IND", "AUS", "ENG", "NZ", "SA", "WI", "PAK", "SL"];

/// `teams` teams with the default purse and the settings' initial boosters.
pub fn teams(count: usize, settings: &Settings) -> Vec<Team> {
    (1..=count)
        .map(|i| {
            Team::new(
                format!("Team {i}"),
                format!("Owner {i}"),
                constants::DEFAULT_TEAM_PURSE,
                settings.initial_boosters_per_team,
            )
        })
        .collect()
}

/// `per_category` players in every category, with random skill and country.
pub fn players<R: Rng + ?Sized>(per_category: usize, rng: &mut R) -> Vec<Player> {
    Category::ALL
        .iter()
        .flat_map(|&category| (1..=per_category).map(move |i| (category, i)))
        .map(|(category, i)| {
            let skill = SKILLS.choose(rng).copied().unwrap_or("All-rounder");
            let country = COUNTRIES.choose(rng).copied().unwrap_or("IND");
            Player::new(format!("{category} Player {i}"), category, skill, country)
        })
        .collect()
}

pub fn roster<R: Rng + ?Sized>(
    teams_count: usize,
    per_category: usize,
    settings: &Settings,
    rng: &mut R,
) -> MemoryRoster {
    MemoryRoster::with_records(teams(teams_count, settings), players(per_category, rng))
}
