use serde::Serialize;

use phishshield_core::api::{
    normalize_url, screen, AppConfig, GatekeeperRules, IgnoreReason, NavigationEvent,
    RedirectTarget, Verdict,
};
use phishshield_plugins::factory::build_scorer;

use crate::error::CliError;

pub const EXIT_BENIGN: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_PHISHING: i32 = 2;

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    url: &'a str,
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignored: Option<IgnoreReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verdict: Option<&'a Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

/// Scores one URL the way `watch` would for a main-frame navigation.
/// Exit code: 0 benign or ignored, 2 phishing, 1 when scoring failed.
pub async fn handle_check(url: &str, cfg: &AppConfig) -> Result<i32, CliError> {
    let rules = cfg.gatekeeper_rules();
    let event = NavigationEvent::main_frame(0, url);

    if let Some(reason) = screen(&rules, &event) {
        print_report(&report(url, &rules, Some(reason), None))?;
        return Ok(EXIT_BENIGN);
    }

    let scorer = build_scorer(cfg)?;
    match scorer.score(url).await {
        Ok(verdict) => {
            print_report(&report(url, &rules, None, Some(&verdict)))?;
            Ok(if verdict.is_phishing {
                EXIT_PHISHING
            } else {
                EXIT_BENIGN
            })
        }
        Err(e) => {
            tracing::warn!(
                target: "phishshield.check",
                url = %url,
                kind = e.kind(),
                error = %e,
                "scoring failed"
            );
            eprintln!("check failed: {e}");
            Ok(EXIT_FAILURE)
        }
    }
}

fn report<'a>(
    url: &'a str,
    rules: &GatekeeperRules,
    ignored: Option<IgnoreReason>,
    verdict: Option<&'a Verdict>,
) -> CheckReport<'a> {
    let redirect = verdict
        .filter(|v| v.is_phishing)
        .map(|v| RedirectTarget::build(&rules.block_page_url, url, &v.reasons).to_url());
    CheckReport {
        url,
        key: normalize_url(url),
        ignored,
        verdict,
        redirect,
    }
}

fn print_report(report: &CheckReport<'_>) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
