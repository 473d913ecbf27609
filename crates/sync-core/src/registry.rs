//! The allow-list of tables eligible for synchronization.
//!
//! The list is fixed at build time; changing it is a deploy. Every table is
//! keyed by an integer primary key column named `id`.

use crate::error::SyncError;

/// Tables the master will export and the client will request, in load order.
pub const ALLOWED_TABLES: &[&str] = &[
    "ballot_ballotitem",
    "position_positionentered",
    "campaign_campaignx",
    "campaign_campaignx_owner",
    "campaign_campaignx_politician",
    "campaign_campaignxlistedbyorganization",
    "campaign_campaignxnewsitem",
    "campaign_campaignxseofriendlypath",
    "campaign_campaignxsupporter",
    "candidate_candidatesarenotduplicates",
    "candidate_candidatetoofficelink",
    "election_ballotpediaelection",
    "election_election",
    "electoral_district_electoraldistrict",
    "issue_issue",
    "issue_organizationlinktoissue",
    "measure_contestmeasure",
    "measure_contestmeasuresarenotduplicates",
    "office_contestoffice",
    "office_contestofficesarenotduplicates",
    "office_contestofficevisitingotherelection",
    "office_held_officeheld",
    "organization_organizationreserveddomain",
    "party_party",
    "politician_politician",
    "politician_politiciansarenotduplicates",
    "representative_representative",
    "representative_representativesarenotduplicates",
    "twitter_twitterlinktoorganization",
    "voter_guide_voterguidepossibility",
    "voter_guide_voterguidepossibilityposition",
    "voter_guide_voterguide",
    "wevote_settings_wevotesetting",
    "ballot_ballotreturned",
    "polling_location_pollinglocation",
    "organization_organization",
    "candidate_candidatecampaign",
];

/// Primary key column shared by every allow-listed table.
pub const PRIMARY_KEY_COLUMN: &str = "id";

/// Rows per chunk unless a table says otherwise.
pub const DEFAULT_CHUNK_SIZE: i64 = 500_000;

/// Columns known not to carry meaningful identifiers upstream. Blank, zero or
/// NULL values here are replaced with synthesized ids.
pub const DUMMY_ID_COLUMNS: &[&str] = &[
    "ballotpedia_election_id",
    "bioguide_id",
    "thomas_id",
    "lis_id",
    "govtrack_id",
    "fec_id",
    "maplight_id",
];

/// Per-table adjustments applied on top of the generic cleaning passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableRules {
    /// Chunk size for unusually wide tables.
    pub chunk_size: Option<i64>,
    /// `(column, value)` pairs substituted for blank or NULL cells.
    pub column_defaults: &'static [(&'static str, &'static str)],
    /// Columns whose backslashes are removed before type coercion.
    pub strip_backslashes: &'static [&'static str],
}

/// Returns the rules for `table_name`; tables without special handling get
/// [`TableRules::default`].
pub fn rules_for(table_name: &str) -> TableRules {
    match table_name {
        "candidate_candidatecampaign" => TableRules {
            chunk_size: Some(100_000),
            ..TableRules::default()
        },
        "politician_politician" => TableRules {
            column_defaults: &[("gender", "U")],
            strip_backslashes: &["middle_name"],
            ..TableRules::default()
        },
        "polling_location_pollinglocation" => TableRules {
            strip_backslashes: &["location_name"],
            ..TableRules::default()
        },
        _ => TableRules::default(),
    }
}

/// Whether `table_name` is on the build-time allow-list.
pub fn is_allowed(table_name: &str) -> bool {
    ALLOWED_TABLES.contains(&table_name)
}

/// An ordered view over the allow-list.
///
/// The default registry covers every allowed table. A restricted registry keeps
/// registry order and can never name a table outside [`ALLOWED_TABLES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRegistry {
    tables: Vec<&'static str>,
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self {
            tables: ALLOWED_TABLES.to_vec(),
        }
    }
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the registry to `names`, preserving allow-list order.
    ///
    /// An empty `names` keeps every table. Any name outside the allow-list is
    /// rejected with a `NotAllowed` error.
    pub fn restricted_to<S: AsRef<str>>(names: &[S]) -> Result<Self, SyncError> {
        if names.is_empty() {
            return Ok(Self::default());
        }

        if let Some(unknown) = names.iter().map(AsRef::as_ref).find(|n| !is_allowed(n)) {
            return Err(SyncError::not_allowed(unknown));
        }

        let tables = ALLOWED_TABLES
            .iter()
            .copied()
            .filter(|allowed| names.iter().any(|n| n.as_ref() == *allowed))
            .collect();

        Ok(Self { tables })
    }

    pub fn is_allowed(&self, table_name: &str) -> bool {
        self.tables.contains(&table_name)
    }

    pub fn list_allowed(&self) -> &[&'static str] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_allow_list_has_no_duplicates() {
        let mut names = ALLOWED_TABLES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALLOWED_TABLES.len());
    }

    #[test]
    fn test_is_allowed() {
        assert!(is_allowed("election_election"));
        assert!(is_allowed("candidate_candidatecampaign"));
        assert!(!is_allowed("voter_voter"));
        assert!(!is_allowed(""));
        assert!(!is_allowed("election_election; DROP TABLE voter_voter"));
    }

    #[test]
    fn test_default_registry_keeps_order() {
        let registry = TableRegistry::default();
        assert_eq!(registry.list_allowed(), ALLOWED_TABLES);
        assert_eq!(registry.list_allowed()[0], "ballot_ballotitem");
        assert_eq!(
            registry.list_allowed().last(),
            Some(&"candidate_candidatecampaign")
        );
    }

    #[test]
    fn test_restricted_registry_uses_allow_list_order() {
        let registry =
            TableRegistry::restricted_to(&["party_party", "ballot_ballotitem"]).unwrap();
        assert_eq!(
            registry.list_allowed(),
            &["ballot_ballotitem", "party_party"]
        );
        assert!(registry.is_allowed("party_party"));
        assert!(!registry.is_allowed("election_election"));
    }

    #[test]
    fn test_restricted_registry_rejects_unknown_tables() {
        let err = TableRegistry::restricted_to(&["party_party", "auth_user"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAllowed);
        assert!(err.message().contains("auth_user"));
    }

    #[test]
    fn test_empty_restriction_means_everything() {
        let names: Vec<String> = Vec::new();
        let registry = TableRegistry::restricted_to(&names).unwrap();
        assert_eq!(registry.len(), ALLOWED_TABLES.len());
    }

    #[test]
    fn test_rules_for_heavy_table() {
        assert_eq!(
            rules_for("candidate_candidatecampaign").chunk_size,
            Some(100_000)
        );
        assert_eq!(rules_for("election_election"), TableRules::default());
    }

    #[test]
    fn test_rules_for_politician() {
        let rules = rules_for("politician_politician");
        assert_eq!(rules.column_defaults, &[("gender", "U")]);
        assert_eq!(rules.strip_backslashes, &["middle_name"]);
    }
}
