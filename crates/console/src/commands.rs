//! Command-line surface. Each subcommand drives one page through the same
//! transitions an interactive front end would and prints the result.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use heritage_client::HeritageBackend;
use heritage_core::collation::TitleCollator;
use heritage_core::draft::{HeritageChange, QuizChange};
use heritage_core::error::CoreError;
use heritage_core::filter::{HeritageFilter, SortOrder};
use heritage_core::types::DbId;
use heritage_core::vocabulary::Vocabulary;

use crate::pages::{HeritageBrowser, ImageManager};
use crate::render;

#[derive(Parser, Debug)]
#[command(
    name = "heritage-console",
    version,
    about = "Manage heritage images, analyses and quizzes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List uploaded images
    Images,
    /// Upload an image file
    Upload { path: PathBuf },
    /// Delete an image and its analysis
    Delete { image_id: DbId },
    /// Show the stored analysis of an image
    Analysis { image_id: DbId },
    /// Run analysis on an image
    Analyze { image_id: DbId },
    /// Edit one entry of an image's analysis
    EditAnalysis {
        image_id: DbId,
        entry_id: DbId,
        #[command(flatten)]
        fields: HeritageEditArgs,
    },
    /// List heritage entries
    Heritages(ListArgs),
    /// Show one heritage entry
    Heritage {
        id: String,
        /// Also show the entry's quizzes
        #[arg(long)]
        quizzes: bool,
    },
    /// Edit a heritage entry
    EditHeritage {
        id: String,
        #[command(flatten)]
        fields: HeritageEditArgs,
    },
    /// List the quizzes of a heritage entry
    Quizzes { heritage_id: String },
    /// Generate a quiz for a heritage entry
    GenerateQuiz { heritage_id: String },
    /// Edit a quiz item
    EditQuiz {
        heritage_id: String,
        quiz_id: DbId,
        #[command(flatten)]
        fields: QuizEditArgs,
    },
    /// Print the controlled vocabularies
    Vocabulary,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive title substring
    #[arg(long)]
    pub search: Option<String>,
    /// Comma-separated criteria the entry must all have
    #[arg(long)]
    pub criteria: Option<String>,
    /// UNESCO classification tag
    #[arg(long)]
    pub unesco: Option<String>,
    /// Region tag (repeatable)
    #[arg(long)]
    pub region: Vec<String>,
    /// Feature tag (repeatable)
    #[arg(long)]
    pub feature: Vec<String>,
    /// Sort titles descending
    #[arg(long)]
    pub desc: bool,
}

impl ListArgs {
    /// Build the list filter. Every value must come from `vocab`.
    pub fn to_filter(&self, vocab: &Vocabulary) -> Result<HeritageFilter, CoreError> {
        let criteria = match self.criteria.as_deref() {
            Some(raw) => parse_criteria(raw)?,
            None => Vec::new(),
        };
        let filter = HeritageFilter {
            search: self.search.clone().unwrap_or_default(),
            criteria,
            unesco_tag: self.unesco.clone(),
            regions: self.region.clone(),
            features: self.feature.clone(),
        };
        filter.validate(vocab)?;
        Ok(filter)
    }
}

fn parse_criteria(raw: &str) -> Result<Vec<u32>, CoreError> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<u32>()
                .map_err(|_| CoreError::UnknownCriterion(token.to_string()))
        })
        .collect()
}

/// Field options shared by the heritage edit commands. Omitted options
/// leave the field unchanged.
#[derive(Args, Debug, Default)]
pub struct HeritageEditArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub summary: Option<String>,
    /// Key points, one per line
    #[arg(long)]
    pub simple_summary: Option<String>,
    /// Comma-separated criteria numbers
    #[arg(long)]
    pub criteria: Option<String>,
    #[arg(long, conflicts_with = "clear_unesco")]
    pub unesco: Option<String>,
    #[arg(long)]
    pub clear_unesco: bool,
    /// Comma-separated country names
    #[arg(long)]
    pub country: Option<String>,
    /// Region tag to add or remove (repeatable)
    #[arg(long)]
    pub toggle_region: Vec<String>,
    /// Feature tag to add or remove (repeatable)
    #[arg(long)]
    pub toggle_feature: Vec<String>,
}

impl HeritageEditArgs {
    pub fn into_changes(self) -> Vec<HeritageChange> {
        let mut changes = Vec::new();
        changes.extend(self.title.map(HeritageChange::Title));
        changes.extend(self.description.map(HeritageChange::Description));
        changes.extend(self.summary.map(HeritageChange::Summary));
        changes.extend(self.simple_summary.map(HeritageChange::SimpleSummary));
        changes.extend(self.criteria.map(HeritageChange::Criteria));
        if self.clear_unesco {
            changes.push(HeritageChange::UnescoTag(None));
        } else if let Some(tag) = self.unesco {
            changes.push(HeritageChange::UnescoTag(Some(tag)));
        }
        changes.extend(self.country.map(HeritageChange::Country));
        changes.extend(self.toggle_region.into_iter().map(HeritageChange::ToggleRegion));
        changes.extend(self.toggle_feature.into_iter().map(HeritageChange::ToggleFeature));
        changes
    }
}

#[derive(Args, Debug, Default)]
pub struct QuizEditArgs {
    #[arg(long)]
    pub question: Option<String>,
    /// Answer options, one per line
    #[arg(long)]
    pub options: Option<String>,
    #[arg(long)]
    pub answer: Option<String>,
}

impl QuizEditArgs {
    pub fn into_changes(self) -> Vec<QuizChange> {
        let mut changes = Vec::new();
        changes.extend(self.question.map(QuizChange::Question));
        changes.extend(self.options.map(QuizChange::Options));
        changes.extend(self.answer.map(QuizChange::Answer));
        changes
    }
}

/// Shared handles every command needs.
pub struct Session<B: HeritageBackend + ?Sized> {
    pub backend: Arc<B>,
    pub vocabulary: Arc<Vocabulary>,
    pub collation_locale: String,
}

impl<B: HeritageBackend + ?Sized> Session<B> {
    fn image_manager(&self) -> ImageManager<B> {
        ImageManager::new(Arc::clone(&self.backend), Arc::clone(&self.vocabulary))
    }

    fn heritage_browser(&self) -> anyhow::Result<HeritageBrowser<B>> {
        let collator = TitleCollator::new(&self.collation_locale)?;
        Ok(HeritageBrowser::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.vocabulary),
            collator,
        ))
    }
}

/// Execute one command, writing its output to `out`.
///
/// Fails when the page ends in an error, so the process exits non-zero.
pub async fn run<B, W>(command: Command, session: &Session<B>, out: &mut W) -> anyhow::Result<()>
where
    B: HeritageBackend + ?Sized,
    W: Write,
{
    match command {
        Command::Images => {
            let mut page = session.image_manager();
            page.refresh().await?;
            fail_on(page.error())?;
            write!(out, "{}", render::image_table(page.images().images()))?;
        }
        Command::Upload { path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let filename = file_name(&path)?;

            let mut page = session.image_manager();
            page.upload(&filename, bytes).await?;
            fail_on(page.error())?;
            write!(out, "{}", render::image_table(page.images().images()))?;
        }
        Command::Delete { image_id } => {
            let mut page = open_image(session, image_id).await?;
            page.delete().await?;
            fail_on(page.error())?;
            writeln!(out, "Deleted image {image_id}")?;
            write!(out, "{}", render::image_table(page.images().images()))?;
        }
        Command::Analysis { image_id } => {
            let page = open_image(session, image_id).await?;
            print_analysis(&page, out)?;
            fail_on(page.error())?;
        }
        Command::Analyze { image_id } => {
            let mut page = open_image(session, image_id).await?;
            page.analyze().await?;
            fail_on(page.error())?;
            print_analysis(&page, out)?;
        }
        Command::EditAnalysis {
            image_id,
            entry_id,
            fields,
        } => {
            let mut page = open_image(session, image_id).await?;
            page.start_edit(entry_id)?;
            for change in fields.into_changes() {
                page.change_edit(change)?;
            }
            page.commit_edit().await?;
            fail_on(page.error())?;
            print_analysis(&page, out)?;
        }
        Command::Heritages(args) => {
            let mut page = session.heritage_browser()?;
            page.load_list().await?;
            fail_on(page.error())?;
            page.set_filter(args.to_filter(&session.vocabulary)?)?;
            if args.desc && page.list().order() == SortOrder::Ascending {
                page.toggle_sort();
            }
            write!(out, "{}", render::heritage_table(&page.list().visible()))?;
        }
        Command::Heritage { id, quizzes } => {
            let mut page = open_heritage(session, &id).await?;
            if quizzes {
                page.show_quizzes().await?;
            }
            fail_on(page.error())?;
            print_heritage(&page, out)?;
        }
        Command::EditHeritage { id, fields } => {
            let mut page = open_heritage(session, &id).await?;
            page.start_edit()?;
            for change in fields.into_changes() {
                page.change_edit(change)?;
            }
            page.commit_edit().await?;
            fail_on(page.error())?;
            print_heritage(&page, out)?;
        }
        Command::Quizzes { heritage_id } => {
            let mut page = open_heritage(session, &heritage_id).await?;
            page.show_quizzes().await?;
            fail_on(page.error())?;
            print_heritage(&page, out)?;
        }
        Command::GenerateQuiz { heritage_id } => {
            let mut page = open_heritage(session, &heritage_id).await?;
            let id = page
                .detail()
                .heritage_id()
                .context("No heritage entry open")?;
            page.generate_quiz(id).await?;
            fail_on(page.error())?;
            print_heritage(&page, out)?;
        }
        Command::EditQuiz {
            heritage_id,
            quiz_id,
            fields,
        } => {
            let mut page = open_heritage(session, &heritage_id).await?;
            page.show_quizzes().await?;
            fail_on(page.error())?;
            page.start_quiz_edit(quiz_id)?;
            for change in fields.into_changes() {
                page.change_quiz_edit(change)?;
            }
            page.commit_quiz_edit().await?;
            fail_on(page.error())?;
            print_heritage(&page, out)?;
        }
        Command::Vocabulary => {
            write!(out, "{}", render::vocabulary(&session.vocabulary))?;
        }
    }
    Ok(())
}

async fn open_image<B: HeritageBackend + ?Sized>(
    session: &Session<B>,
    image_id: DbId,
) -> anyhow::Result<ImageManager<B>> {
    let mut page = session.image_manager();
    page.refresh().await?;
    fail_on(page.error())?;
    page.select_id(image_id).await?;
    Ok(page)
}

/// Open a heritage detail; invalid and missing ids are errors here.
async fn open_heritage<B: HeritageBackend + ?Sized>(
    session: &Session<B>,
    raw_id: &str,
) -> anyhow::Result<HeritageBrowser<B>> {
    let mut page = session.heritage_browser()?;
    page.open_by_id(raw_id).await;
    fail_on(page.error())?;
    if page.detail().entry().is_none() {
        let status = render::detail_status(page.detail().state())
            .unwrap_or_else(|| "Heritage entry unavailable".to_string());
        anyhow::bail!(status);
    }
    Ok(page)
}

fn print_analysis<B, W>(page: &ImageManager<B>, out: &mut W) -> anyhow::Result<()>
where
    B: HeritageBackend + ?Sized,
    W: Write,
{
    let url = page.images().selected().map(|img| page.image_url(img));
    write!(out, "{}", render::analysis_panel(page.analysis(), url.as_deref()))?;
    Ok(())
}

fn print_heritage<B, W>(page: &HeritageBrowser<B>, out: &mut W) -> anyhow::Result<()>
where
    B: HeritageBackend + ?Sized,
    W: Write,
{
    match page.detail().entry() {
        Some(entry) => writeln!(out, "{}", render::heritage_detail(entry))?,
        None => {
            if let Some(status) = render::detail_status(page.detail().state()) {
                writeln!(out, "{status}")?;
            }
        }
    }
    if page.view() == crate::pages::DetailView::DetailsAndQuiz {
        if let Some(quizzes) = page.quizzes().quizzes() {
            write!(out, "{}", render::quiz_list(quizzes))?;
        }
    }
    Ok(())
}

fn fail_on(error: Option<&str>) -> anyhow::Result<()> {
    match error {
        Some(message) => anyhow::bail!("{message}"),
        None => Ok(()),
    }
}

fn file_name(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("{} has no file name", path.display()))
}
