use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Instrument};

use udise_groups::app::group_use_case::GroupSyncUseCase;
use udise_groups::app::media_use_case::{MediaDeletion, MediaFile, MediaUploadOutcome, MediaUseCase};
use udise_groups::app::number_use_case::{AdditionOutcome, NumberAdditionUseCase};
use udise_groups::app::ports::{ContentApiPort, GroupApiPort};
use udise_groups::app::template_use_case::{TemplateDraft, TemplateUseCase};
use udise_groups::app::unmatched_use_case::UnmatchedGroupsUseCase;
use udise_groups::app::upload_use_case::UploadSession;
use udise_groups::config::Config;
use udise_groups::constants::{DEFAULT_EXPORT_FILE, DEFAULT_MEDIA_TYPE};
use udise_groups::infra::http_client::ReqwestGroupApi;
use udise_groups::infra::xlsx_export::export_unmatched_groups;
use udise_groups::logging;
use udise_groups::pipeline::listing::{filter_by_name, paginate};
use udise_groups::pipeline::preview::Preview;
use udise_groups::pipeline::{extract_identifiers, AutoDecoder, SpreadsheetDecoder};
use udise_groups::types::Location;

#[derive(Parser)]
#[command(name = "udise_groups")]
#[command(about = "Match school UDISE codes to WhatsApp groups and manage group membership")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to config.toml (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct LocationArgs {
    /// District name, e.g. Khordha
    #[arg(long)]
    district: String,
    /// Block name within the district
    #[arg(long)]
    block: String,
}

impl From<&LocationArgs> for Location {
    fn from(args: &LocationArgs) -> Self {
        Location::new(args.district.clone(), args.block.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the UDISE codes found in a spreadsheet without sending anything
    Preview {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "")]
        district: String,
        #[arg(long, default_value = "")]
        block: String,
    },
    /// Send the UDISE codes in a spreadsheet for group matching
    Submit {
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Number of groups known for a district/block
    Count {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Resync all groups from the messaging provider
    Sync {
        /// Confirm the resync
        #[arg(long)]
        yes: bool,
    },
    /// Add a mobile number to every group in a district/block
    AddNumber {
        #[command(flatten)]
        location: LocationArgs,
        /// Ten-digit mobile number without country code
        #[arg(long)]
        number: String,
    },
    /// Show number-addition progress for a district/block
    Status {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// List groups that could not be matched to a school
    Unmatched {
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Case-insensitive name filter
        #[arg(long, default_value = "")]
        search: String,
        /// Write the full (filtered) list to an xlsx file instead of printing a page
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILE)]
        export: Option<PathBuf>,
    },
    /// Manage message templates
    Templates {
        #[command(subcommand)]
        action: TemplateCommand,
    },
    /// Manage uploaded media
    Media {
        #[command(subcommand)]
        action: MediaCommand,
    },
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// List templates, optionally filtered by name
    List {
        #[arg(long, default_value = "")]
        search: String,
        /// How many matches to show (defaults to the page size)
        #[arg(long)]
        show: Option<usize>,
    },
    /// Create a template, or update it when --id is given
    Save {
        /// Stored id of the template to update
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: String,
        /// `text`, or any media type such as `image`
        #[arg(long = "type", default_value = "text")]
        kind: String,
        #[arg(long, default_value = "")]
        media_url: String,
        /// One message; repeat for several
        #[arg(long = "text")]
        texts: Vec<String>,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
enum MediaCommand {
    /// List uploaded media of one type
    List {
        #[arg(long = "type", default_value = DEFAULT_MEDIA_TYPE)]
        media_type: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Upload a file; the backend stores it asynchronously
    Upload {
        #[arg(long)]
        file: PathBuf,
        #[arg(long = "type", default_value = DEFAULT_MEDIA_TYPE)]
        media_type: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete media by name
    Delete {
        #[arg(long)]
        name: String,
        #[arg(long = "type", default_value = DEFAULT_MEDIA_TYPE)]
        media_type: String,
        /// Delete even when a template still uses it
        #[arg(long)]
        force: bool,
    },
}

fn build_api(config: &Config) -> anyhow::Result<Arc<dyn GroupApiPort>> {
    let api = ReqwestGroupApi::new(&config.api).context("Could not set up backend client")?;
    Ok(Arc::new(api))
}

fn build_content_api(config: &Config) -> anyhow::Result<Arc<dyn ContentApiPort>> {
    let api = ReqwestGroupApi::new(&config.api).context("Could not set up backend client")?;
    Ok(Arc::new(api))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Preview {
            file,
            district,
            block,
        } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Could not read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let rows = AutoDecoder.decode(&file_name, &bytes)?;
            let identifiers = extract_identifiers(&rows);
            let location = Location::new(district, block);
            print!("{}", Preview::new(&identifiers, &location).render());
        }
        Commands::Submit { file, location } => {
            let span = tracing::info_span!("submit", file = %file.display());
            async {
                let mut session = UploadSession::new(build_api(&config)?);
                session.select_location(Location::from(&location));
                session.load_path(&file).await?;
                print!("{}", session.preview().render());

                let reply = session.submit().await?;
                println!("✅ UDISE codes submitted successfully!");
                info!(reply = %reply, "Backend reply");
                Ok::<_, anyhow::Error>(())
            }
            .instrument(span)
            .await?;
        }
        Commands::Count { location } => {
            let use_case = GroupSyncUseCase::new(build_api(&config)?);
            let count = use_case.count(&Location::from(&location)).await?;
            println!("{count}");
        }
        Commands::Sync { yes } => {
            if !yes {
                anyhow::bail!("Refusing to resync all groups without --yes");
            }
            let use_case = GroupSyncUseCase::new(build_api(&config)?);
            use_case.sync().await?;
            println!("✅ Sync started successfully!");
        }
        Commands::AddNumber { location, number } => {
            let location = Location::from(&location);
            let use_case = NumberAdditionUseCase::new(build_api(&config)?);
            match use_case.add(&location, &number).await? {
                AdditionOutcome::Added { number } => {
                    println!(
                        "✅ +{} added successfully to {} / {}",
                        number, location.district, location.block
                    );
                }
                AdditionOutcome::Rejected { reply } => {
                    anyhow::bail!("Failed to add number: {reply}");
                }
            }
        }
        Commands::Status { location } => {
            let use_case = NumberAdditionUseCase::new(build_api(&config)?);
            let status = use_case.status(&Location::from(&location)).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Unmatched {
            page,
            search,
            export,
        } => {
            let use_case = UnmatchedGroupsUseCase::new(build_api(&config)?, config.ui.page_size);
            let groups = use_case.fetch().await?;

            if let Some(path) = export {
                let matches: Vec<_> = filter_by_name(&groups, &search)
                    .into_iter()
                    .cloned()
                    .collect();
                export_unmatched_groups(&matches, &path)?;
                println!("📄 Exported {} groups to {}", matches.len(), path.display());
                return Ok(());
            }

            let listing = use_case.page_of(&groups, &search, page);
            if listing.total_matches == 0 {
                println!("No unmatched groups found.");
                return Ok(());
            }
            println!("{:>6}  {:<32}  Name", "SL No.", "ID");
            for (serial, group) in &listing.rows {
                println!("{:>6}  {:<32}  {}", serial, group.display_id(), group.display_name());
            }
            println!(
                "Page {} of {} ({} groups)",
                listing.page, listing.total_pages, listing.total_matches
            );
        }
        Commands::Templates { action } => {
            let use_case = TemplateUseCase::new(build_content_api(&config)?);
            match action {
                TemplateCommand::List { search, show } => {
                    let templates = use_case.list().await?;
                    let shown = show.unwrap_or(config.ui.page_size);
                    let (visible, total) = TemplateUseCase::visible(&templates, &search, shown);
                    if total == 0 {
                        println!("No templates found.");
                        return Ok(());
                    }
                    for template in &visible {
                        println!(
                            "{:<26}  {:<6}  {}",
                            template.stored_id().unwrap_or_default(),
                            template.kind,
                            template.display_name()
                        );
                    }
                    if total > visible.len() {
                        println!("Showing {} of {} (use --show for more)", visible.len(), total);
                    }
                }
                TemplateCommand::Save {
                    id,
                    name,
                    kind,
                    media_url,
                    texts,
                } => {
                    let draft = TemplateDraft {
                        stored_id: id,
                        name,
                        kind,
                        media_url,
                        texts,
                    };
                    let updating = draft.stored_id.is_some();
                    use_case.save(&draft).await?;
                    if updating {
                        println!("✅ Template updated successfully!");
                    } else {
                        println!("✅ Template created successfully!");
                    }
                }
                TemplateCommand::Delete { id } => {
                    use_case.delete(&id).await?;
                    println!("🗑️ Template deleted");
                }
            }
        }
        Commands::Media { action } => {
            let use_case = MediaUseCase::new(build_content_api(&config)?);
            match action {
                MediaCommand::List { media_type, page } => {
                    let items = use_case.list(&media_type).await?;
                    let listing = paginate(&items, page, config.ui.page_size);
                    if listing.total_items == 0 {
                        println!("No media found.");
                        return Ok(());
                    }
                    for (offset, item) in listing.items.iter().enumerate() {
                        println!(
                            "{:>4}  {:<32}  {}",
                            listing.first_serial() + offset,
                            item.media_name,
                            item.media_url
                        );
                    }
                    println!("Page {} of {}", listing.page, listing.total_pages);
                }
                MediaCommand::Upload {
                    file,
                    media_type,
                    description,
                } => {
                    let bytes = tokio::fs::read(&file)
                        .await
                        .with_context(|| format!("Could not read {}", file.display()))?;
                    let media = MediaFile::from_path(&file);
                    match use_case
                        .upload(&media, bytes, &media_type, &description)
                        .await?
                    {
                        MediaUploadOutcome::Initiated => {
                            println!("✅ Save initiated. Please refresh after a while.");
                        }
                        MediaUploadOutcome::Unexpected { status } => {
                            anyhow::bail!("Something went wrong! (HTTP {status})");
                        }
                    }
                }
                MediaCommand::Delete {
                    name,
                    media_type,
                    force,
                } => {
                    let items = use_case.list(&media_type).await?;
                    let item = items
                        .iter()
                        .find(|item| item.media_name == name)
                        .with_context(|| format!("No {media_type} media named '{name}'"))?;
                    match use_case.delete(item, force).await? {
                        MediaDeletion::Deleted => println!("🗑️ Successfully deleted"),
                        MediaDeletion::InUse => println!(
                            "⚠️ This media is used in a template. Re-run with --force to delete it."
                        ),
                    }
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let guard = logging::init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        eprintln!("❌ {:#}", e);
        drop(guard);
        std::process::exit(1);
    }
}
