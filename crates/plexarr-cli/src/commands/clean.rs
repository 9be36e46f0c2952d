use color_eyre::eyre::eyre;
use color_eyre::Result;
use plexarr_core::{clean_duplicates, ActionOptions, Confirm};
use crate::commands::progress::Spinner;
use crate::commands::{finish_report, prompts, tables, Services};
use crate::output::Output;

/// Keep the best file of every Radarr movie with several files
pub async fn run_clean(services: &Services, dry_run: bool, confirm: bool, output: &Output) -> Result<()> {
    let radarr = services.require_radarr()?;

    let spinner = Spinner::start("Fetching movies from Radarr...", output.is_human());
    let movies = radarr.list_items().await?;
    spinner.set_message(format!("Checking files of {} movies...", movies.len()));

    let options = ActionOptions {
        dry_run,
        confirm,
        ..Default::default()
    };
    // Prompts cannot share the terminal with a running spinner
    let report = if confirm && !dry_run {
        spinner.finish();
        let mut ask = prompts::confirm_each();
        let ask: Confirm<'_> = &mut ask;
        clean_duplicates(radarr, &movies, &options, Some(ask)).await
    } else {
        let report = clean_duplicates(radarr, &movies, &options, None).await;
        spinner.finish();
        report
    };

    if !output.is_human() {
        output.data(&report);
    } else if report.plans.is_empty() {
        output.success("No movies with duplicate files");
    } else {
        output.println(tables::duplicate_table(&report.plans).to_string());
        finish_report(output, "delete", &report.files)?;
    }

    if report.files.has_failures() {
        return Err(eyre!("{} file(s) could not be deleted", report.files.failed.len()));
    }
    Ok(())
}
