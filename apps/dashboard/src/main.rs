use std::{path::Path, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{
    load_settings, AnswerHistory, ClientSettings, CollectionView, CommitOutcome, HttpDataSource,
    ImageResolver, LoadState, Notifier, ProfileField, QuestionComposer, QuestionField,
    RemoteDataSource, StaticCredential, Synchronizer, UserField,
};
use shared::{
    domain::{Gender, Profile, Question, QuestionId, User, UserId},
    protocol::ImageUpload,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod demo;

#[derive(Parser, Debug)]
#[command(about = "Admin dashboard for users and questions")]
struct Args {
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    /// Serve from built-in sample data instead of the backend.
    #[arg(long)]
    demo: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    Questions {
        #[command(subcommand)]
        action: QuestionAction,
    },
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand, Debug)]
enum UserAction {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Show {
        id: String,
    },
    Edit {
        id: String,
        #[command(flatten)]
        fields: UserEdits,
    },
}

#[derive(ClapArgs, Debug)]
struct UserEdits {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    age: Option<String>,
    /// male, female, other, or an empty string to clear.
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    notifications: Option<bool>,
    #[arg(long)]
    image: Option<String>,
}

#[derive(Subcommand, Debug)]
enum QuestionAction {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Edit {
        id: String,
        #[arg(long)]
        text: Option<String>,
        /// Replaces the option list; repeat for each option.
        #[arg(long = "option")]
        options: Vec<String>,
    },
    Create {
        #[arg(long)]
        text: String,
        #[arg(long = "option")]
        options: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    Show,
    Edit {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
}

struct Dashboard {
    source: Arc<dyn RemoteDataSource>,
    images: ImageResolver,
    notifier: Notifier,
    page_size: u32,
}

impl Dashboard {
    fn new(args: &Args) -> Result<Self> {
        let mut settings = load_settings();
        if let Some(api_url) = &args.api_url {
            settings.api_url = api_url.clone();
        }
        if let Some(token) = &args.token {
            settings.access_token = Some(token.clone());
        }
        if let Some(page_size) = args.page_size {
            settings.page_size = page_size.max(1);
        }

        debug!(
            "dashboard: api_url={} page_size={} demo={}",
            settings.api_url, settings.page_size, args.demo
        );
        let source: Arc<dyn RemoteDataSource> = if args.demo {
            Arc::new(demo::sample_source())
        } else {
            Arc::new(build_http_source(&settings)?)
        };

        Ok(Self {
            source,
            images: ImageResolver::new(settings.image_base()),
            notifier: Notifier::new(),
            page_size: settings.page_size,
        })
    }

    fn synchronizer<E: client_core::EditableEntity>(&self) -> Synchronizer<E> {
        Synchronizer::new(
            Arc::clone(&self.source),
            self.images.clone(),
            self.notifier.clone(),
        )
    }
}

fn build_http_source(settings: &ClientSettings) -> Result<HttpDataSource> {
    let credentials = Arc::new(StaticCredential::new(settings.access_token.clone()));
    HttpDataSource::new(settings, credentials).context("failed to configure backend client")
}

const REAUTH_HINT: &str = "pass a fresh --token or set ACCESS_TOKEN";

fn ensure_loaded(state: LoadState, what: &str) -> Result<()> {
    match state {
        LoadState::Ready => Ok(()),
        LoadState::Failed(failure) if failure.requires_reauth => {
            bail!("could not load {what}: {failure}; {REAUTH_HINT}")
        }
        LoadState::Failed(failure) => bail!("could not load {what}: {failure}"),
        other => bail!("could not load {what}: {other:?}"),
    }
}

fn report<E>(outcome: CommitOutcome<E>, what: &str) -> Result<E> {
    match outcome {
        CommitOutcome::Committed(entity) => Ok(entity),
        CommitOutcome::Failed(failure) if failure.requires_reauth => {
            bail!("saving {what} failed: {failure}; {REAUTH_HINT}")
        }
        CommitOutcome::Failed(failure) => bail!("saving {what} failed: {failure}"),
        CommitOutcome::Rejected(err) => bail!("{what} not saved: {err}"),
        CommitOutcome::Discarded => bail!("{what} changed while saving; result discarded"),
        CommitOutcome::Ignored(reason) => bail!("{what} not saved: {reason:?}"),
    }
}

async fn read_image(path: &str) -> Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image '{path}'"))?;
    let filename = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let mime_type = mime_guess::from_path(path).first().map(|mime| mime.to_string());
    Ok(ImageUpload {
        filename,
        mime_type,
        bytes,
    })
}

fn print_user(user: &User, images: &ImageResolver) {
    println!("id:            {}", user.id);
    println!("name:          {}", user.display_name());
    println!("last name:     {}", user.last_name.as_deref().unwrap_or(""));
    println!("email:         {}", user.email);
    println!("joined:        {}", user.join_date());
    println!(
        "age:           {}",
        user.age.map(|age| age.to_string()).unwrap_or_default()
    );
    println!("gender:        {}", user.gender.as_deref().unwrap_or(""));
    println!("notifications: {}", user.is_notification);
    println!("image:         {}", images.resolve(user.image.as_deref()));
}

fn print_question(question: &Question) {
    println!("{}  {}", question.id, question.question);
    for (index, option) in question.options.iter().enumerate() {
        println!("    {}. {option}", index + 1);
    }
}

async fn users(dashboard: &Dashboard, action: UserAction) -> Result<()> {
    match action {
        UserAction::List { page } => {
            let view: CollectionView<User> = CollectionView::new(
                Arc::clone(&dashboard.source),
                dashboard.page_size,
                dashboard.notifier.clone(),
            );
            ensure_loaded(view.refresh().await, "users")?;
            if page != 1 && !view.set_page(page).await {
                bail!(
                    "page {page} is out of range (1..={})",
                    view.paginator().await.total_pages()
                );
            }
            ensure_loaded(view.load_state().await, "users")?;

            for user in view.items().await {
                println!(
                    "{}  {:<20} {:<30} {}",
                    user.id,
                    user.display_name(),
                    user.email,
                    user.join_date()
                );
            }
            let paginator = view.paginator().await;
            println!(
                "page {}/{} ({} users)",
                paginator.page_index(),
                paginator.total_pages(),
                paginator.total_count()
            );
        }
        UserAction::Show { id } => {
            let id = UserId(id);
            let sync: Synchronizer<User> = dashboard.synchronizer();
            ensure_loaded(sync.open(&id).await, "user")?;
            if let Some(user) = sync.snapshot().await {
                print_user(&user, &dashboard.images);
            }

            let history = AnswerHistory::new(
                Arc::clone(&dashboard.source),
                dashboard.notifier.clone(),
            );
            if let LoadState::Failed(failure) = history.load(Some(&id)).await {
                println!("answers: unavailable ({failure})");
                return Ok(());
            }
            let answers = history.answers().await;
            println!("answers:       {}", answers.len());
            for answer in answers {
                println!(
                    "  [{}] {} -> {}",
                    answer.created_at.format("%Y-%m-%d"),
                    answer.question_text,
                    answer.answer_text
                );
            }
        }
        UserAction::Edit { id, fields } => {
            let sync: Synchronizer<User> = dashboard.synchronizer();
            ensure_loaded(sync.open(&UserId(id)).await, "user")?;
            sync.begin_edit().await;

            if let Some(value) = fields.first_name {
                sync.update_field(UserField::FirstName(value)).await;
            }
            if let Some(value) = fields.last_name {
                sync.update_field(UserField::LastName(value)).await;
            }
            if let Some(value) = fields.age {
                sync.update_field(UserField::Age(value)).await;
            }
            if let Some(value) = fields.gender {
                let gender = if value.trim().is_empty() {
                    None
                } else {
                    Some(
                        Gender::parse(&value)
                            .with_context(|| format!("unknown gender '{value}'"))?,
                    )
                };
                sync.update_field(UserField::Gender(gender)).await;
            }
            if let Some(value) = fields.notifications {
                sync.update_field(UserField::Notifications(value)).await;
            }
            if let Some(path) = fields.image {
                sync.update_field(UserField::Image(read_image(&path).await?)).await;
            }

            let updated = report(sync.commit_edit().await, "user")?;
            print_user(&updated, &dashboard.images);
        }
    }
    Ok(())
}

async fn questions(dashboard: &Dashboard, action: QuestionAction) -> Result<()> {
    match action {
        QuestionAction::List { page } => {
            let view: CollectionView<Question> = CollectionView::new(
                Arc::clone(&dashboard.source),
                dashboard.page_size,
                dashboard.notifier.clone(),
            );
            ensure_loaded(view.refresh().await, "questions")?;
            if page != 1 && !view.set_page(page).await {
                bail!(
                    "page {page} is out of range (1..={})",
                    view.paginator().await.total_pages()
                );
            }
            ensure_loaded(view.load_state().await, "questions")?;

            for question in view.items().await {
                print_question(&question);
            }
            let paginator = view.paginator().await;
            println!("page {}/{}", paginator.page_index(), paginator.total_pages());
        }
        QuestionAction::Edit { id, text, options } => {
            let sync: Synchronizer<Question> = dashboard.synchronizer();
            ensure_loaded(sync.open(&QuestionId(id)).await, "question")?;
            sync.begin_edit().await;

            if let Some(text) = text {
                sync.update_field(QuestionField::Text(text)).await;
            }
            if !options.is_empty() {
                let current = sync.buffer().await.map(|b| b.options.len()).unwrap_or(0);
                for (index, option) in options.iter().enumerate() {
                    if index >= current {
                        sync.add_option().await;
                    }
                    sync.set_option(index, option.clone()).await;
                }
                // Leftover entries are blanked and dropped at commit.
                for index in options.len()..current {
                    sync.set_option(index, "").await;
                }
            }

            let updated = report(sync.commit_edit().await, "question")?;
            print_question(&updated);
        }
        QuestionAction::Create { text, options } => {
            let composer =
                QuestionComposer::new(Arc::clone(&dashboard.source), dashboard.notifier.clone());
            composer.set_text(text).await;
            for (index, option) in options.into_iter().enumerate() {
                if index >= composer.draft().await.options.len() {
                    composer.add_option().await;
                }
                composer.set_option(index, option).await;
            }

            let created = report(composer.submit().await, "question")?;
            print_question(&created);
        }
    }
    Ok(())
}

async fn profile(dashboard: &Dashboard, action: ProfileAction) -> Result<()> {
    let sync: Synchronizer<Profile> = dashboard.synchronizer();
    ensure_loaded(sync.load_own().await, "profile")?;

    let profile = match action {
        ProfileAction::Show => sync.snapshot().await,
        ProfileAction::Edit {
            first_name,
            phone,
            image,
        } => {
            sync.begin_edit().await;
            if let Some(value) = first_name {
                sync.update_field(ProfileField::FirstName(value)).await;
            }
            if let Some(value) = phone {
                sync.update_field(ProfileField::Phone(value)).await;
            }
            if let Some(path) = image {
                sync.update_field(ProfileField::Image(read_image(&path).await?)).await;
            }
            Some(report(sync.commit_edit().await, "profile")?)
        }
    };

    if let Some(profile) = profile {
        println!("name:  {}", profile.display_name());
        println!("email: {}", profile.email);
        println!("phone: {}", profile.phone.as_deref().unwrap_or(""));
        println!("image: {}", dashboard.images.resolve(Some(profile.image_path())));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();
    let dashboard = Dashboard::new(&args)?;

    match args.command {
        Command::Users { action } => users(&dashboard, action).await,
        Command::Questions { action } => questions(&dashboard, action).await,
        Command::Profile { action } => profile(&dashboard, action).await,
    }
}
