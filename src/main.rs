use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use leasehold::config::AppConfig;
use leasehold::error::AppError;
use leasehold::telemetry;
use leasehold::workflows::leasing::onboarding::{
    onboarding_router, ActorId, DocumentClaim, DocumentKind, LeaseOnboardingService, LeaseTerms,
    MemoryAccountDirectory, MemoryLeasingStore, OnboardingError, OnboardingReceipt,
    OnboardingRequest, Space, SpaceId, SpaceStatus, SpaceType, SpaceTypeId, StaticRoleDirectory,
    TenantIntake,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

type Service =
    LeaseOnboardingService<MemoryLeasingStore, MemoryAccountDirectory, StaticRoleDirectory>;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Lease Onboarding Orchestrator",
    about = "Run the property-management lease onboarding service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Onboard a tenant against a seeded in-memory store and print the receipt
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Code of the seeded space to lease
    #[arg(long, default_value = "ESP-001")]
    space_code: String,
    /// Tenant email to provision the account under
    #[arg(long, default_value = "juan@example.com")]
    email: String,
    /// Tenant full name
    #[arg(long, default_value = "Juan Pérez")]
    full_name: String,
    /// Identity document number
    #[arg(long, default_value = "12345678")]
    document_number: String,
    /// Lease start date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, default_value = "2025-01-01")]
    start_date: NaiveDate,
    /// Optional lease end date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    end_date: Option<NaiveDate>,
    /// Monthly amount
    #[arg(long, default_value_t = 500)]
    monthly_amount: u32,
    /// Terminate the lease again after onboarding
    #[arg(long)]
    terminate: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn build_service(store: Arc<MemoryLeasingStore>) -> Arc<Service> {
    let accounts = Arc::new(MemoryAccountDirectory::new());
    let roles = Arc::new(StaticRoleDirectory::default());
    Arc::new(LeaseOnboardingService::new(store, accounts, roles))
}

fn seed_spaces(store: &MemoryLeasingStore) -> Result<Vec<Space>, AppError> {
    let apartment = SpaceType {
        id: SpaceTypeId(Uuid::new_v4()),
        name: "Apartment".to_string(),
    };
    let office = SpaceType {
        id: SpaceTypeId(Uuid::new_v4()),
        name: "Office".to_string(),
    };
    store
        .insert_space_type(apartment.clone())
        .map_err(OnboardingError::from)?;
    store
        .insert_space_type(office.clone())
        .map_err(OnboardingError::from)?;

    let spaces = vec![
        Space {
            id: SpaceId(Uuid::new_v4()),
            code: "ESP-001".to_string(),
            space_type_id: apartment.id,
            status: SpaceStatus::Available,
            active: true,
        },
        Space {
            id: SpaceId(Uuid::new_v4()),
            code: "ESP-002".to_string(),
            space_type_id: apartment.id,
            status: SpaceStatus::Available,
            active: true,
        },
        Space {
            id: SpaceId(Uuid::new_v4()),
            code: "OFC-101".to_string(),
            space_type_id: office.id,
            status: SpaceStatus::Maintenance,
            active: true,
        },
    ];
    for space in &spaces {
        store
            .insert_space(space.clone())
            .map_err(OnboardingError::from)?;
    }

    Ok(spaces)
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let store = Arc::new(MemoryLeasingStore::new());
    let spaces = seed_spaces(&store)?;
    let service = build_service(store);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(onboarding_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    let codes: Vec<&str> = spaces.iter().map(|space| space.code.as_str()).collect();
    info!(?config.environment, %addr, seeded_spaces = ?codes, "lease onboarding service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(MemoryLeasingStore::new());
    let spaces = seed_spaces(&store)?;
    let service = build_service(store);

    let space = spaces
        .iter()
        .find(|space| space.code == args.space_code)
        .ok_or(AppError::Onboarding(OnboardingError::SpaceNotFound))?;

    let request = OnboardingRequest {
        space_id: space.id,
        tenant: TenantIntake {
            full_name: args.full_name,
            email: args.email,
            document: DocumentClaim {
                kind: DocumentKind::NationalId,
                number: args.document_number,
            },
            phone: None,
            address: None,
            occupation: None,
            declared_monthly_income: None,
            vehicle_plate: None,
        },
        lease: LeaseTerms {
            start_date: args.start_date,
            end_date: args.end_date,
            monthly_amount: args.monthly_amount,
            deposit: None,
            notes: Some("Onboarded from the demo command".to_string()),
        },
        registered_by: ActorId(Uuid::new_v4()),
    };

    let receipt = service.onboard(request).map_err(AppError::Onboarding)?;
    render_receipt(&receipt);

    if args.terminate {
        let detail = service
            .terminate(&receipt.lease.lease.id)
            .map_err(AppError::Onboarding)?;
        println!("\nLease terminated");
        println!(
            "- Lease status: {} | Space {} status: {}",
            detail.lease.status.label(),
            detail.space.code,
            detail.space.status.label()
        );
    }

    Ok(())
}

fn render_receipt(receipt: &OnboardingReceipt) {
    let detail = &receipt.lease;
    println!("Lease onboarding demo");
    println!(
        "Space {} ({}) now {}",
        detail.space.code,
        detail.space_type.name,
        detail.space.status.label()
    );
    println!(
        "Tenant {} <{}> on document {} {}",
        detail.tenant.full_name,
        detail.tenant.email,
        detail.document.kind.label(),
        detail.document.number
    );
    println!(
        "Lease {} | {} -> {} | {}/month | status {}",
        detail.lease.id.0,
        detail.lease.start_date,
        detail
            .lease
            .end_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "open-ended".to_string()),
        detail.lease.monthly_amount,
        detail.lease.status.label()
    );

    let notice = &receipt.provisioning;
    println!(
        "\nSpace status: {} -> {}",
        notice.space_status_before.label(),
        notice.space_status_after.label()
    );
    println!(
        "Account {} temporary credential: {}",
        notice.account_email, notice.temporary_credential
    );
    println!("{}", notice.disclaimer);
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
