use crate::cli::command_handlers::{
    ActivityHandler, AuthHandler, DomainHandler, EmailHandler, Output, ProfileHandler,
    ResourceHandler, SmsHandler,
};
use crate::cli::main_types::Commands;
use mailersend_core::api::client::MailerSendClient;
use mailersend_core::core::services::client_factory::{ClientFactory, InvocationContext};
use mailersend_core::core::services::config_service::ConfigService;
use mailersend_core::error::AppError;
use mailersend_core::utils::logging::print_verbose;

pub struct Dispatcher {
    ctx: InvocationContext,
    factory: ClientFactory,
}

impl Dispatcher {
    fn log_verbose(&self, msg: &str) {
        print_verbose(self.ctx.verbose, msg);
    }

    pub fn new(ctx: InvocationContext) -> Self {
        Self {
            ctx,
            factory: ClientFactory::from_env(),
        }
    }

    // Helper method to create an authenticated client for API commands
    async fn create_client(&self) -> Result<MailerSendClient, AppError> {
        if let Some(profile) = &self.ctx.profile {
            self.log_verbose(&format!("Using profile override '{}'", profile));
        }
        self.factory.build(&self.ctx).await
    }

    // Helper method to create ConfigService over the invocation's config file
    fn create_config_service(&self) -> Result<ConfigService, AppError> {
        let path = self.ctx.config_path()?;
        self.log_verbose(&format!("Using config file {}", path.display()));
        ConfigService::load(path)
    }

    fn output(&self) -> Output {
        Output::new(self.ctx.json)
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Auth { command } => {
                let handler = AuthHandler::new(self.output());
                let mut config_service = self.create_config_service()?;
                handler.handle(command, &mut config_service, &self.ctx)
            }
            Commands::Profile { command } => {
                let handler = ProfileHandler::new(self.output());
                let mut config_service = self.create_config_service()?;
                handler.handle(command, &mut config_service)
            }
            Commands::Domain { command } => {
                let client = self.create_client().await?;
                DomainHandler::new(self.output()).handle(command, &client).await
            }
            Commands::Activity { command } => {
                let client = self.create_client().await?;
                ActivityHandler::new(self.output())
                    .handle(command, &client)
                    .await
            }
            Commands::Email { command } => {
                let client = self.create_client().await?;
                EmailHandler::new(self.output()).handle(command, &client).await
            }
            Commands::Sms { command } => {
                let client = self.create_client().await?;
                SmsHandler::new(self.output()).handle(command, &client).await
            }
            Commands::Template { command } => {
                let client = self.create_client().await?;
                ResourceHandler::new(self.output())
                    .templates(command, &client)
                    .await
            }
            Commands::Webhook { command } => {
                let client = self.create_client().await?;
                ResourceHandler::new(self.output())
                    .webhooks(command, &client)
                    .await
            }
            Commands::Token { command } => {
                let client = self.create_client().await?;
                ResourceHandler::new(self.output())
                    .tokens(command, &client)
                    .await
            }
        }
    }
}
