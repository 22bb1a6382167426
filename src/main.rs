use std::{error::Error, path::Path, sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use tokio::{
    fs, signal,
    time::{self, Instant},
};
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
};

use campus_fix::{
    api::{
        ticket::{Code, ServiceType, Status},
        user::Role,
    },
    client::Service,
    display::DisplayTicket,
    filter::{Filter, Selector},
    view::{
        self, table, Level, LoginPage, ManagementDashboard, RaiseIssue,
        RegisterPage, Route, Toasts, TrackRequests,
    },
    Client, Config, Session,
};

#[derive(Parser)]
#[command(name = "campus-fix", about = "Campus maintenance requests")]
struct Cli {
    /// Configuration file. Defaults apply when it does not exist.
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the credential.
    Login {
        college_id: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        college_id: String,
        #[arg(long, default_value = "student")]
        user_type: Role,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored credential.
    Logout,
    /// File a maintenance issue.
    Raise {
        /// Service code (`plumbing`) or label (`Plumber`).
        #[arg(long)]
        service: ServiceType,
        #[arg(long)]
        location: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// List your own tickets.
    Track {
        #[arg(long, default_value = "all")]
        status: Selector<Status>,
        /// Also print the details of this ticket.
        #[arg(long)]
        show: Option<String>,
    },
    /// Watch every ticket, refreshing until Ctrl-C.
    Dashboard {
        #[arg(long, default_value = "all")]
        status: Selector<Status>,
        #[arg(long, default_value = "all")]
        service: Selector<ServiceType>,
        #[arg(long, default_value = "")]
        search: String,
        /// Print once and exit.
        #[arg(long)]
        once: bool,
    },
    /// Change the status of a ticket.
    SetStatus { code: String, status: Status },
    /// Print one ticket.
    Show { code: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(Path::new(&cli.config)).await?;
    let session = Session::load(&config.session.path).await?;
    let client: Arc<dyn Service> =
        Arc::new(Client::new(&config.http, session.clone())?);
    let toasts = Toasts::new();

    let next = run(cli.command, client, &session, &config, &toasts).await;
    print_toasts(&toasts);
    if let Some(route) = next {
        println!("-> {route}");
    }

    Ok(())
}

async fn load_config(path: &Path) -> Result<Config, Box<dyn Error>> {
    match fs::read_to_string(path).await {
        Ok(raw) => Ok(toml::from_str::<Config>(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}

async fn run(
    command: Command,
    client: Arc<dyn Service>,
    session: &Session,
    config: &Config,
    toasts: &Toasts,
) -> Option<Route> {
    match command {
        Command::Login {
            college_id,
            password,
        } => {
            let mut page = LoginPage::new(client, toasts.clone());
            page.college_id = college_id;
            page.password = password;
            page.submit().await
        }
        Command::Register {
            name,
            email,
            college_id,
            user_type,
            password,
        } => {
            let mut page = RegisterPage::new(client, toasts.clone());
            page.name = name;
            page.email = email;
            page.college_id = college_id;
            page.user_type = user_type;
            page.password = password;
            page.submit().await
        }
        Command::Logout => Some(view::logout(session, toasts).await),
        Command::Raise {
            service,
            location,
            description,
            image_url,
        } => {
            let mut form = RaiseIssue::new(client, toasts.clone());
            form.choose(service);
            form.location = location;
            form.description = description;
            form.image_url = image_url;
            form.submit().await
        }
        Command::Track { status, show } => {
            let mut page = TrackRequests::new(client, toasts.clone());
            page.set_status_filter(status).await;
            if let Some(code) = show {
                if page.select(&Code::from(code.as_str())).is_none() {
                    toasts.error(format!("No request {code} in your list"));
                }
            }
            println!("{}", page.render());
            None
        }
        Command::Dashboard {
            status,
            service,
            search,
            once,
        } => {
            let mut dashboard =
                ManagementDashboard::new(client, toasts.clone(), config.poll.interval);
            dashboard.filter = Filter {
                status,
                service,
                search,
            };
            if once {
                dashboard.refresh().await;
                println!("{}", dashboard.render());
            } else {
                watch(&mut dashboard, config.poll.interval, toasts).await;
            }
            None
        }
        Command::SetStatus { code, status } => {
            let dashboard =
                ManagementDashboard::new(client, toasts.clone(), config.poll.interval);
            if dashboard.change_status(&Code::from(code), status).await {
                println!("{}", dashboard.render());
            }
            None
        }
        Command::Show { code } => {
            match client.get_ticket(&Code::from(code)).await {
                Ok(ticket) => {
                    println!("{}", table::details(&DisplayTicket::from(ticket)))
                }
                Err(e) => toasts.error(
                    e.detail().map_or_else(|| e.to_string(), str::to_string),
                ),
            }
            None
        }
    }
}

/// Redraws the dashboard shortly after every poll until Ctrl-C.
async fn watch(dashboard: &mut ManagementDashboard, period: Duration, toasts: &Toasts) {
    dashboard.mount();

    let period = period.max(Duration::from_secs(1));
    let mut redraw =
        time::interval_at(Instant::now() + Duration::from_secs(1), period);
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => break,
            _ = redraw.tick() => {
                print_toasts(toasts);
                println!("{}\n", dashboard.render());
            }
        }
    }

    dashboard.unmount();
}

fn print_toasts(toasts: &Toasts) {
    for toast in toasts.drain() {
        match toast.level {
            Level::Success => eprintln!("ok: {}", toast.message),
            Level::Error => eprintln!("error: {}", toast.message),
        }
    }
}
