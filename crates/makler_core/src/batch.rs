use admin_logging::{admin_info, admin_warn};

use crate::postal::{PostalCode, PostalCodeSet};
use crate::search_url::{CodecError, SearchSpec, SearchUrlCodec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUrl {
    postal_code: PostalCode,
    url: String,
}

impl GeneratedUrl {
    pub fn postal_code(&self) -> &PostalCode {
        &self.postal_code
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    pub urls: Vec<GeneratedUrl>,
    /// Input tokens dropped because they are not valid postal codes.
    pub skipped: Vec<String>,
    pub duplicates: usize,
    pub failures: Vec<(PostalCode, CodecError)>,
}

impl BatchOutcome {
    pub fn count(&self) -> usize {
        self.urls.len()
    }

    pub fn url_strings(&self) -> Vec<String> {
        self.urls.iter().map(|u| u.url.clone()).collect()
    }
}

/// Produces one search URL per unique valid postal code, in input order.
#[derive(Debug, Clone)]
pub struct BatchUrlGenerator {
    codec: SearchUrlCodec,
    template: SearchSpec,
}

impl BatchUrlGenerator {
    pub fn new(template: SearchSpec) -> Self {
        Self::with_codec(SearchUrlCodec::default(), template)
    }

    pub fn with_codec(codec: SearchUrlCodec, template: SearchSpec) -> Self {
        Self { codec, template }
    }

    pub fn generate(&self, postal_text: &str) -> BatchOutcome {
        self.generate_for(&PostalCodeSet::parse(postal_text))
    }

    pub fn generate_for(&self, codes: &PostalCodeSet) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            skipped: codes.rejected().to_vec(),
            duplicates: codes.duplicates(),
            ..BatchOutcome::default()
        };

        for code in codes.iter() {
            match self.codec.encode(&self.template, code.as_str()) {
                Ok(url) => outcome.urls.push(GeneratedUrl {
                    postal_code: code.clone(),
                    url,
                }),
                Err(err) => {
                    admin_warn!("Failed to generate url for postal code {}: {}", code, err);
                    outcome.failures.push((code.clone(), err));
                }
            }
        }

        admin_info!(
            "Generated {} search urls ({} skipped, {} duplicates)",
            outcome.count(),
            outcome.skipped.len(),
            outcome.duplicates
        );
        outcome
    }
}
