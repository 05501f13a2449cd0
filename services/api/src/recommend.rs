use crate::infra::{parse_answer, InMemoryRecommendationRepository, InMemorySurveyStore};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use youth_policy::config::RecommendationConfig;
use youth_policy::error::AppError;
use youth_policy::recommendation::{
    region_display_name, RecommendationRun, RecommendationService, RecommendationServiceError,
    ReferenceCatalog, RunKey, SurveyAnswer,
};

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Directory holding the reference CSV tables.
    #[arg(long, default_value = "data")]
    pub(crate) data_dir: PathBuf,
    /// Survey answer as QUESTION=OPTION (e.g. Q1=25). Repeat for every answered question.
    #[arg(long = "answer", value_parser = parse_answer, required = true)]
    pub(crate) answers: Vec<SurveyAnswer>,
    /// Name shown next to the region reasons (defaults to the user id).
    #[arg(long)]
    pub(crate) username: Option<String>,
    /// User id recorded on the stored rows.
    #[arg(long, default_value = "cli-user")]
    pub(crate) user_id: String,
    /// Number of regions to recommend.
    #[arg(long, default_value_t = 3)]
    pub(crate) top_regions: usize,
    /// Policies listed per region.
    #[arg(long, default_value_t = 4)]
    pub(crate) policies_per_region: usize,
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let RecommendArgs {
        data_dir,
        answers,
        username,
        user_id,
        top_regions,
        policies_per_region,
    } = args;

    let catalog = ReferenceCatalog::from_dir(&data_dir)?;
    let config = RecommendationConfig {
        data_dir,
        top_regions,
        group_policy_limit: policies_per_region,
        ..RecommendationConfig::default()
    };

    let key = RunKey::new(user_id.clone(), "cli");
    let surveys = InMemorySurveyStore::default();
    surveys
        .record(key.clone(), answers)
        .map_err(RecommendationServiceError::from)?;
    let service = RecommendationService::new(
        Arc::new(surveys),
        Arc::new(InMemoryRecommendationRepository::default()),
        Arc::new(catalog),
        &config,
    );

    let run = service.recompute(&key)?;
    render_regions(service.catalog(), &run);

    println!("\nRecommended policies");
    for group in service.groups(&key)? {
        println!(
            "{}. {} ({})",
            group.rank_group, group.region_display_name, group.selected_region_code
        );
        if let Some(description) = &group.region_description {
            println!("   {}", description);
        }
        if group.policies.is_empty() {
            println!("   - no eligible policies");
        }
        for ranked in &group.policies {
            let agency = ranked.policy.agency.as_deref().unwrap_or("unknown agency");
            println!(
                "   - #{} {} [{}] ({})",
                ranked.rank, ranked.policy.title, ranked.policy.policy_code, agency
            );
        }
    }

    let username = username.unwrap_or(user_id);
    println!("\nWhy these regions, {}", username);
    for view in service.region_reasons(&key, &username)? {
        println!("{}. {}", view.rank_group, view.region_display_name);
        for reason in &view.reasons {
            println!("   - {}", reason);
        }
    }

    Ok(())
}

fn render_regions(catalog: &ReferenceCatalog, run: &RecommendationRun) {
    println!("Top regions (run {})", run.run);
    for (position, region) in run.regions.iter().enumerate() {
        println!(
            "{}. {} ({}) score {:.2}",
            position + 1,
            region_display_name(catalog, &region.region_code),
            region.region_code,
            region.total_infra_score
        );
    }
    println!("{} recommendation rows stored", run.recommendations.len());
}
