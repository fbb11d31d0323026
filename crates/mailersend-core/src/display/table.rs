use crate::api::models::{Activity, ApiToken, Domain, Template, Webhook};
use crate::core::services::types::ProfileSummary;
use crate::utils::text::{format_datetime, truncate_text};
use comfy_table::{Attribute, Cell, Color, Table, presets};
use crossterm::terminal;

struct ColumnWidths {
    name: usize,
    detail: usize,
}

/// Renders API resources as terminal tables.
pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: colors_enabled(),
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _)) => {
                let width = cols as usize;
                Some(width.clamp(40, 200))
            }
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn bold_header(&self, text: &str, color: Color) -> Cell {
        if self.use_colors {
            Cell::new(text).add_attribute(Attribute::Bold).fg(color)
        } else {
            Cell::new(text).add_attribute(Attribute::Bold)
        }
    }

    fn colored_cell(&self, text: &str, color: Color) -> Cell {
        if self.use_colors {
            Cell::new(text).fg(color)
        } else {
            Cell::new(text)
        }
    }

    fn flag_cell(&self, value: bool) -> Cell {
        if value {
            self.colored_cell("yes", Color::Green)
        } else {
            self.colored_cell("no", Color::Red)
        }
    }

    fn set_colored_headers(&self, table: &mut Table, headers: &[&str], color: Color) {
        let cells: Vec<Cell> = headers.iter().map(|h| self.bold_header(h, color)).collect();
        table.set_header(cells);
    }

    fn new_table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        self.configure_table_width(&mut table);
        self.set_colored_headers(&mut table, headers, Color::Cyan);
        table
    }

    pub fn render_domains(&self, domains: &[Domain]) -> String {
        if domains.is_empty() {
            return "No domains found.".to_string();
        }

        let widths = self.get_responsive_column_widths();
        let mut table = self.new_table(&["ID", "Name", "Verified", "DNS Active", "Created"]);
        for domain in domains {
            table.add_row(vec![
                self.colored_cell(&domain.id, Color::Yellow),
                Cell::new(truncate_text(&domain.name, widths.name)),
                self.flag_cell(domain.is_verified),
                self.flag_cell(domain.is_dns_active),
                Cell::new(format_optional_date(domain.created_at.as_deref())),
            ]);
        }
        table.to_string()
    }

    pub fn render_domain_detail(&self, domain: &Domain) -> String {
        let mut table = self.new_table(&["Field", "Value"]);
        table.add_row(vec![Cell::new("ID"), Cell::new(&domain.id)]);
        table.add_row(vec![Cell::new("Name"), Cell::new(&domain.name)]);
        table.add_row(vec![Cell::new("Verified"), self.flag_cell(domain.is_verified)]);
        table.add_row(vec![
            Cell::new("DNS Active"),
            self.flag_cell(domain.is_dns_active),
        ]);
        table.add_row(vec![
            Cell::new("Created"),
            Cell::new(domain.created_at.as_deref().unwrap_or("-")),
        ]);
        table.to_string()
    }

    pub fn render_activity(&self, activities: &[Activity]) -> String {
        if activities.is_empty() {
            return "No activity found.".to_string();
        }

        let widths = self.get_responsive_column_widths();
        let mut table = self.new_table(&["ID", "Event", "Recipient", "Subject", "Created"]);
        for activity in activities {
            let email = activity.email.clone().unwrap_or_default();
            let recipient = email.recipient.map(|r| r.email).unwrap_or_default();
            table.add_row(vec![
                self.colored_cell(&activity.id, Color::Yellow),
                Cell::new(&activity.event),
                Cell::new(truncate_text(&recipient, widths.name)),
                Cell::new(truncate_text(
                    email.subject.as_deref().unwrap_or("-"),
                    widths.detail,
                )),
                Cell::new(activity.created_at.as_deref().unwrap_or("-")),
            ]);
        }
        table.to_string()
    }

    pub fn render_templates(&self, templates: &[Template]) -> String {
        if templates.is_empty() {
            return "No templates found.".to_string();
        }

        let widths = self.get_responsive_column_widths();
        let mut table = self.new_table(&["ID", "Name", "Type", "Created"]);
        for template in templates {
            table.add_row(vec![
                self.colored_cell(&template.id, Color::Yellow),
                Cell::new(truncate_text(&template.name, widths.name)),
                Cell::new(template.kind.as_deref().unwrap_or("-")),
                Cell::new(format_optional_date(template.created_at.as_deref())),
            ]);
        }
        table.to_string()
    }

    pub fn render_webhooks(&self, webhooks: &[Webhook]) -> String {
        if webhooks.is_empty() {
            return "No webhooks found.".to_string();
        }

        let widths = self.get_responsive_column_widths();
        let mut table = self.new_table(&["ID", "Name", "URL", "Enabled", "Events"]);
        for webhook in webhooks {
            table.add_row(vec![
                self.colored_cell(&webhook.id, Color::Yellow),
                Cell::new(truncate_text(&webhook.name, widths.name)),
                Cell::new(truncate_text(&webhook.url, widths.detail)),
                self.flag_cell(webhook.enabled),
                Cell::new(webhook.events.len().to_string()),
            ]);
        }
        table.to_string()
    }

    pub fn render_tokens(&self, tokens: &[ApiToken]) -> String {
        if tokens.is_empty() {
            return "No API tokens found.".to_string();
        }

        let widths = self.get_responsive_column_widths();
        let mut table = self.new_table(&["ID", "Name", "Status", "Created"]);
        for token in tokens {
            table.add_row(vec![
                self.colored_cell(&token.id, Color::Yellow),
                Cell::new(truncate_text(&token.name, widths.name)),
                Cell::new(token.status.as_deref().unwrap_or("-")),
                Cell::new(format_optional_date(token.created_at.as_deref())),
            ]);
        }
        table.to_string()
    }

    pub fn render_profiles(&self, profiles: &[ProfileSummary]) -> String {
        if profiles.is_empty() {
            return "No profiles configured.".to_string();
        }

        let mut table = self.new_table(&["", "Profile", "Credential", "OAuth Expires"]);
        for profile in profiles {
            let marker = if profile.active {
                self.colored_cell("*", Color::Green)
            } else {
                Cell::new("")
            };
            table.add_row(vec![
                marker,
                Cell::new(&profile.name),
                Cell::new(profile.credential.label()),
                Cell::new(
                    profile
                        .oauth_expires_at
                        .map(|at| at.to_rfc3339())
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]);
        }
        table.to_string()
    }

    fn configure_table_width(&self, table: &mut Table) {
        let width = self
            .max_width
            .map(|w| if w > 20 { w - 6 } else { w.max(40) })
            .unwrap_or(80);
        table.set_width(width as u16);
    }

    fn get_responsive_column_widths(&self) -> ColumnWidths {
        match self.max_width.unwrap_or(80) {
            0..=59 => ColumnWidths {
                name: 15,
                detail: 15,
            },
            60..=79 => ColumnWidths {
                name: 20,
                detail: 20,
            },
            80..=119 => ColumnWidths {
                name: 30,
                detail: 30,
            },
            _ => ColumnWidths {
                name: 45,
                detail: 50,
            },
        }
    }

    pub fn render_simple_table(&self, headers: &[&str], rows: &[Vec<String>]) -> String {
        let mut table = self.new_table(headers);
        for row in rows {
            table.add_row(row.iter().map(Cell::new).collect::<Vec<_>>());
        }
        table.to_string()
    }
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Colour is off when `NO_COLOR` is set or stdout is not a terminal.
pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none() && atty::is(atty::Stream::Stdout)
}

fn format_optional_date(value: Option<&str>) -> String {
    value.map(format_datetime).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{ActivityEmail, ActivityRecipient};
    use crate::core::services::types::CredentialKind;

    fn plain_display() -> TableDisplay {
        TableDisplay::new().with_max_width(120).with_colors(false)
    }

    fn create_test_domain(id: &str, name: &str) -> Domain {
        Domain {
            id: id.to_string(),
            name: name.to_string(),
            is_verified: true,
            is_dns_active: false,
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_table_display_creation() {
        let display = TableDisplay::new();
        assert!(display.max_width.is_some());

        let display = TableDisplay::new().with_max_width(100).with_colors(false);
        assert_eq!(display.max_width, Some(100));
        assert!(!display.use_colors);
    }

    #[test]
    fn test_render_domains() {
        let output = plain_display().render_domains(&[
            create_test_domain("x", "a.com"),
            create_test_domain("y", "b.org"),
        ]);
        assert!(output.contains("a.com"));
        assert!(output.contains("b.org"));
        assert!(output.contains("2024-01-01"));
        assert!(output.contains("Verified"));
    }

    #[test]
    fn test_render_empty_lists() {
        let display = plain_display();
        assert_eq!(display.render_domains(&[]), "No domains found.");
        assert_eq!(display.render_activity(&[]), "No activity found.");
        assert_eq!(display.render_profiles(&[]), "No profiles configured.");
    }

    #[test]
    fn test_render_activity() {
        let activity = Activity {
            id: "act-1".to_string(),
            created_at: Some("2025-01-01T10:00:00Z".to_string()),
            event: "delivered".to_string(),
            email: Some(ActivityEmail {
                subject: Some("Welcome".to_string()),
                recipient: Some(ActivityRecipient {
                    email: "x@y.z".to_string(),
                }),
                ..ActivityEmail::default()
            }),
        };
        let output = plain_display().render_activity(&[activity]);
        assert!(output.contains("act-1"));
        assert!(output.contains("delivered"));
        assert!(output.contains("x@y.z"));
        assert!(output.contains("Welcome"));
    }

    #[test]
    fn test_render_profiles_marks_active() {
        let profiles = vec![ProfileSummary {
            name: "work".to_string(),
            active: true,
            credential: CredentialKind::ApiToken,
            oauth_expires_at: None,
        }];
        let output = plain_display().render_profiles(&profiles);
        assert!(output.contains("work"));
        assert!(output.contains("api token"));
        assert!(output.contains('*'));
    }

    #[test]
    fn test_render_simple_table() {
        let output = plain_display().render_simple_table(
            &["Key", "Value"],
            &[vec!["status".to_string(), "202".to_string()]],
        );
        assert!(output.contains("status"));
        assert!(output.contains("202"));
    }
}
