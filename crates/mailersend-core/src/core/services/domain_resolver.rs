//! Maps `--domain` arguments between DNS names and domain IDs.
//!
//! A value containing a `.` is a DNS name; anything else is an ID. The API
//! has no lookup-by-name endpoint, so resolution walks the full domain list.
//! The list is fetched at most once per resolver.

use crate::api::client::MailerSendClient;
use crate::api::models::Domain;
use crate::api::pagination::{Page, fetch_all};
use crate::error::{AppError, ServiceError};
use async_trait::async_trait;

/// Anything that can list domains one page at a time.
#[async_trait]
pub trait DomainSource: Send + Sync {
    async fn domain_page(&self, page: u32, per_page: u32) -> Result<Page<Domain>, AppError>;
}

#[async_trait]
impl DomainSource for MailerSendClient {
    async fn domain_page(&self, page: u32, per_page: u32) -> Result<Page<Domain>, AppError> {
        self.list_domains(page, per_page).await
    }
}

fn is_dns_name(input: &str) -> bool {
    input.contains('.')
}

pub struct DomainResolver<'a, S: DomainSource + ?Sized> {
    source: &'a S,
    domains: Option<Vec<Domain>>,
}

impl<'a, S: DomainSource + ?Sized> DomainResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            domains: None,
        }
    }

    async fn domains(&mut self) -> Result<&[Domain], AppError> {
        if self.domains.is_none() {
            let source = self.source;
            let all = fetch_all(|page, per_page| source.domain_page(page, per_page), 0).await?;
            log::debug!("loaded {} domains for lookup", all.len());
            self.domains = Some(all);
        }
        Ok(self.domains.as_deref().unwrap_or_default())
    }

    /// Domain ID for a name or ID argument.
    pub async fn resolve_id(&mut self, input: &str) -> Result<String, AppError> {
        if !is_dns_name(input) {
            return Ok(input.to_string());
        }

        self.domains()
            .await?
            .iter()
            .find(|domain| domain.name.eq_ignore_ascii_case(input))
            .map(|domain| domain.id.clone())
            .ok_or_else(|| {
                ServiceError::DomainNotFound {
                    input: input.to_string(),
                }
                .into()
            })
    }

    /// Domain name for a name or ID argument.
    pub async fn resolve_name(&mut self, input: &str) -> Result<String, AppError> {
        if is_dns_name(input) {
            return Ok(input.to_string());
        }

        self.domains()
            .await?
            .iter()
            .find(|domain| domain.id == input)
            .map(|domain| domain.name.clone())
            .ok_or_else(|| {
                ServiceError::DomainIdNotFound {
                    id: input.to_string(),
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeDomains {
        pages: Vec<Vec<Domain>>,
        calls: AtomicUsize,
    }

    impl FakeDomains {
        fn new(pages: Vec<Vec<(&str, &str)>>) -> Self {
            let pages = pages
                .into_iter()
                .map(|page| {
                    page.into_iter()
                        .map(|(id, name)| Domain {
                            id: id.to_string(),
                            name: name.to_string(),
                            is_verified: true,
                            is_dns_active: true,
                            created_at: None,
                        })
                        .collect()
                })
                .collect();
            Self {
                pages,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DomainSource for FakeDomains {
        async fn domain_page(&self, page: u32, _per_page: u32) -> Result<Page<Domain>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let index = (page - 1) as usize;
            Ok(Page {
                items: self.pages.get(index).cloned().unwrap_or_default(),
                has_next: index + 1 < self.pages.len(),
            })
        }
    }

    #[tokio::test]
    async fn test_resolve_id_matches_name_case_insensitively() {
        let source = FakeDomains::new(vec![
            vec![("d1", "a.com")],
            vec![("d2", "Mail.Example.org")],
        ]);
        let mut resolver = DomainResolver::new(&source);

        assert_eq!(resolver.resolve_id("mail.example.ORG").await.unwrap(), "d2");
        assert_eq!(resolver.resolve_id("A.COM").await.unwrap(), "d1");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_id_input_is_returned_without_listing() {
        let source = FakeDomains::new(vec![vec![("d1", "a.com")]]);
        let mut resolver = DomainResolver::new(&source);

        assert_eq!(resolver.resolve_id("d9").await.unwrap(), "d9");
        assert_eq!(resolver.resolve_name("b.com").await.unwrap(), "b.com");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_name_and_not_found_errors() {
        let source = FakeDomains::new(vec![vec![("d1", "a.com")]]);
        let mut resolver = DomainResolver::new(&source);

        assert_eq!(resolver.resolve_name("d1").await.unwrap(), "a.com");

        let err = resolver.resolve_id("missing.com").await.unwrap_err();
        assert_eq!(err.to_string(), "domain missing.com not found");

        let err = resolver.resolve_name("d404").await.unwrap_err();
        assert_eq!(err.to_string(), "domain ID d404 not found");
    }
}
