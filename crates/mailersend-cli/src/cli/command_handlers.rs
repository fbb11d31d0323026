use crate::cli::main_types::{
    ActivityCommands, AuthCommands, DomainCommands, EmailCommands, ListOnlyCommands,
    ProfileCommands, SmsCommands, WebhookCommands,
};
use chrono::{Duration, Utc};
use mailersend_core::api::client::MailerSendClient;
use mailersend_core::api::models::{
    ActivityQuery, EmailAddress, EmailRequest, SendOutcome, SmsRequest,
};
use mailersend_core::api::pagination::fetch_all;
use mailersend_core::core::services::client_factory::InvocationContext;
use mailersend_core::core::services::config_service::ConfigService;
use mailersend_core::core::services::domain_resolver::DomainResolver;
use mailersend_core::display::TableDisplay;
use mailersend_core::error::{AppError, CliError};
use mailersend_core::storage::credentials::{CredentialStore, TokenSource};
use mailersend_core::utils::validation::{
    parse_date, validate_api_token, validate_email, validate_phone_number,
};
use serde::Serialize;

/// Chooses between tables on stdout and pretty JSON.
#[derive(Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON in `--json` mode, otherwise the table
    /// produced by `render`.
    fn emit<T, F>(&self, value: &T, render: F) -> Result<(), AppError>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&TableDisplay) -> String,
    {
        if self.json {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| CliError::Output(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", render(&TableDisplay::new()));
        }
        Ok(())
    }

    fn message(&self, value: serde_json::Value, text: &str) -> Result<(), AppError> {
        self.emit(&value, |_| text.to_string())
    }
}

pub struct AuthHandler {
    output: Output,
}

impl AuthHandler {
    pub fn new(output: Output) -> Self {
        Self { output }
    }

    pub fn handle(
        &self,
        command: AuthCommands,
        config_service: &mut ConfigService,
        ctx: &InvocationContext,
    ) -> Result<(), AppError> {
        match command {
            AuthCommands::Login { token, name } => {
                let token = match token {
                    Some(token) => token,
                    None => rpassword::prompt_password("API token: ")
                        .map_err(|e| CliError::InvalidArguments(format!("failed to read token: {}", e)))?,
                };
                let token = token.trim().to_string();
                validate_api_token(&token)?;

                config_service.login(&name, &token)?;
                self.output.message(
                    serde_json::json!({"profile": name, "active": true}),
                    &format!("Logged in. Profile '{}' is now active.", name),
                )
            }
            AuthCommands::Logout { name } => {
                let name = config_service.logout(name.as_deref())?;
                self.output.message(
                    serde_json::json!({"profile": name, "logged_out": true}),
                    &format!("Removed credentials of profile '{}'.", name),
                )
            }
            AuthCommands::Status => {
                let store = CredentialStore::open(config_service.path().to_path_buf())?;
                let source = store.token_source(ctx.profile.as_deref())?;
                let (kind, profile) = match &source {
                    TokenSource::Environment => ("environment", None),
                    TokenSource::ApiToken { profile } => ("api_token", Some(profile.as_str())),
                    TokenSource::OAuth { profile } => ("oauth", Some(profile.as_str())),
                };
                let text = match profile {
                    None => "Using MAILERSEND_API_TOKEN from the environment.".to_string(),
                    Some(profile) => format!(
                        "Using profile '{}' ({}).",
                        profile,
                        kind.replace('_', " ")
                    ),
                };
                self.output.message(
                    serde_json::json!({"source": kind, "profile": profile}),
                    &text,
                )
            }
        }
    }
}

pub struct ProfileHandler {
    output: Output,
}

impl ProfileHandler {
    pub fn new(output: Output) -> Self {
        Self { output }
    }

    pub fn handle(
        &self,
        command: ProfileCommands,
        config_service: &mut ConfigService,
    ) -> Result<(), AppError> {
        match command {
            ProfileCommands::List => {
                let profiles = config_service.list_profiles();
                self.output
                    .emit(&profiles, |table| table.render_profiles(&profiles))
            }
            ProfileCommands::Switch { name } => {
                config_service.switch(&name)?;
                self.output.message(
                    serde_json::json!({"active_profile": name}),
                    &format!("Switched to profile '{}'.", name),
                )
            }
            ProfileCommands::Remove { name } => {
                config_service.remove(&name)?;
                self.output.message(
                    serde_json::json!({"removed": name}),
                    &format!("Removed profile '{}'.", name),
                )
            }
        }
    }
}

pub struct DomainHandler {
    output: Output,
}

impl DomainHandler {
    pub fn new(output: Output) -> Self {
        Self { output }
    }

    pub async fn handle(
        &self,
        command: DomainCommands,
        client: &MailerSendClient,
    ) -> Result<(), AppError> {
        match command {
            DomainCommands::List(args) => {
                let domains = fetch_all(
                    |page, per_page| client.list_domains(page, per_page),
                    args.limit,
                )
                .await?;
                self.output
                    .emit(&domains, |table| table.render_domains(&domains))
            }
            DomainCommands::Get { domain } => {
                let mut resolver = DomainResolver::new(client);
                let id = resolver.resolve_id(&domain).await?;
                let domain = client
                    .get_domain(&id)
                    .await
                    .map_err(|e| e.context(format!("failed to fetch domain {}", id)))?;
                self.output
                    .emit(&domain, |table| table.render_domain_detail(&domain))
            }
        }
    }
}

pub struct ActivityHandler {
    output: Output,
}

impl ActivityHandler {
    pub fn new(output: Output) -> Self {
        Self { output }
    }

    pub async fn handle(
        &self,
        command: ActivityCommands,
        client: &MailerSendClient,
    ) -> Result<(), AppError> {
        let ActivityCommands::List(args) = command;

        let date_to = match &args.date_to {
            Some(value) => parse_date(value)?,
            None => Utc::now(),
        };
        let date_from = match &args.date_from {
            Some(value) => parse_date(value)?,
            None => date_to - Duration::hours(24),
        };
        if date_from >= date_to {
            return Err(CliError::InvalidArguments(
                "--date-from must be earlier than --date-to".to_string(),
            )
            .into());
        }

        let mut resolver = DomainResolver::new(client);
        let domain_id = resolver.resolve_id(&args.domain).await?;
        let query = ActivityQuery {
            date_from,
            date_to,
            events: args.events,
        };

        let activities = fetch_all(
            |page, per_page| client.list_activity(&domain_id, &query, page, per_page),
            args.limit.limit,
        )
        .await?;
        self.output
            .emit(&activities, |table| table.render_activity(&activities))
    }
}

fn render_outcome(kind: &str, outcome: &SendOutcome) -> String {
    match &outcome.message_id {
        Some(id) => format!("{} accepted (status {}, message id {}).", kind, outcome.status, id),
        None => format!("{} accepted (status {}).", kind, outcome.status),
    }
}

pub struct EmailHandler {
    output: Output,
}

impl EmailHandler {
    pub fn new(output: Output) -> Self {
        Self { output }
    }

    pub async fn handle(
        &self,
        command: EmailCommands,
        client: &MailerSendClient,
    ) -> Result<(), AppError> {
        let EmailCommands::Send(args) = command;

        for address in args.to.iter().chain(args.from.iter()) {
            validate_email(address)?;
        }
        if args.text.is_none() && args.html.is_none() {
            return Err(CliError::InvalidArguments(
                "one of --text or --html is required".to_string(),
            )
            .into());
        }

        let email = EmailRequest {
            from: args.from.map(|email| EmailAddress {
                email,
                name: args.from_name,
            }),
            to: args.to.into_iter().map(EmailAddress::new).collect(),
            subject: args.subject,
            text: args.text,
            html: args.html,
        };

        let outcome = client.send_email(&email).await?;
        self.output
            .emit(&outcome, |_| render_outcome("Email", &outcome))
    }
}

pub struct SmsHandler {
    output: Output,
}

impl SmsHandler {
    pub fn new(output: Output) -> Self {
        Self { output }
    }

    pub async fn handle(
        &self,
        command: SmsCommands,
        client: &MailerSendClient,
    ) -> Result<(), AppError> {
        let SmsCommands::Send(args) = command;

        for number in std::iter::once(&args.from).chain(args.to.iter()) {
            validate_phone_number(number)?;
        }

        let sms = SmsRequest {
            from: args.from,
            to: args.to,
            text: args.text,
        };
        let outcome = client.send_sms(&sms).await?;
        self.output
            .emit(&outcome, |_| render_outcome("SMS", &outcome))
    }
}

/// Read-only account resources: templates, webhooks and API tokens.
pub struct ResourceHandler {
    output: Output,
}

impl ResourceHandler {
    pub fn new(output: Output) -> Self {
        Self { output }
    }

    pub async fn templates(
        &self,
        command: ListOnlyCommands,
        client: &MailerSendClient,
    ) -> Result<(), AppError> {
        let ListOnlyCommands::List(args) = command;
        let templates = fetch_all(
            |page, per_page| client.list_templates(page, per_page),
            args.limit,
        )
        .await?;
        self.output
            .emit(&templates, |table| table.render_templates(&templates))
    }

    pub async fn webhooks(
        &self,
        command: WebhookCommands,
        client: &MailerSendClient,
    ) -> Result<(), AppError> {
        let WebhookCommands::List { domain, limit } = command;
        let mut resolver = DomainResolver::new(client);
        let domain_id = resolver.resolve_id(&domain).await?;

        let webhooks = fetch_all(
            |page, per_page| client.list_webhooks(&domain_id, page, per_page),
            limit.limit,
        )
        .await?;
        self.output
            .emit(&webhooks, |table| table.render_webhooks(&webhooks))
    }

    pub async fn tokens(
        &self,
        command: ListOnlyCommands,
        client: &MailerSendClient,
    ) -> Result<(), AppError> {
        let ListOnlyCommands::List(args) = command;
        let tokens = fetch_all(|page, per_page| client.list_tokens(page, per_page), args.limit)
            .await?;
        self.output
            .emit(&tokens, |table| table.render_tokens(&tokens))
    }
}
