use rsy_apputil::{AdDecision, AdEnvironment, AdPacer};
use rsy_config::AdTuning;

pub struct AdPlan {
    pub launch_count: u32,
    pub games: u32,
    pub game_secs: i64,
    pub has_video_ads: bool,
}

/// One line per game end. Shown ads are assumed to complete immediately
/// and to be full length.
pub fn run_ad_plan(tuning: AdTuning, plan: &AdPlan) -> Vec<String> {
    let mut pacer = AdPacer::new(tuning);
    let env = AdEnvironment {
        can_show_ad: true,
        have_pro: false,
        in_tournament: false,
        launch_count: plan.launch_count,
        has_video_ads: plan.has_video_ads,
    };

    let mut lines = Vec::with_capacity(plan.games as usize);
    for game in 1..=i64::from(plan.games) {
        let now_ms = game * plan.game_secs * 1_000;
        let decision = pacer.decide(&env, now_ms);
        if decision.is_show() {
            pacer.record_completion(now_ms, false);
        }
        let shown = match decision {
            AdDecision::Show => "show".to_string(),
            AdDecision::Skip(reason) => format!("skip:{reason:?}"),
        };
        lines.push(format!(
            "game={} t_s={} decision={} ad_amt={:.3}",
            game,
            now_ms / 1_000,
            shown,
            pacer.ad_amt().unwrap_or(0.0)
        ));
    }
    lines
}
