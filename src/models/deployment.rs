use chrono::{DateTime, Utc};
use ethers::types::{Address, H256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata about one completed contract deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub address: Address,
    pub admin: Address,
    pub network_name: String,
    pub chain_id: u64,
    pub deploy_tx: H256,
    pub block_number: Option<u64>,
    pub deployed_at: DateTime<Utc>,
    pub explorer: Option<String>,
    pub constructor_args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_note: Option<String>,
}

/// Most recent deployment on a network, kept under `_latest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestDeployment {
    pub address: Address,
    pub chain_id: u64,
    pub contract: String,
    pub updated_at: DateTime<Utc>,
}

/// Key holding the most recent deployment per network.
pub const LATEST_KEY: &str = "_latest";

/// The persisted `deployed.json` document:
///
/// ```json
/// { "80002": { "X402Splitter": { ... } }, "_latest": { "polygonAmoyTestnet": { ... } } }
/// ```
///
/// Held as raw JSON so entries written by other tools (other contracts,
/// hand-edited keys) survive a read-merge-write untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentDocument {
    entries: Map<String, Value>,
}

impl DeploymentDocument {
    /// The record for `(chain_id, contract)`, if present and well-formed.
    pub fn get(&self, chain_id: u64, contract: &str) -> Option<DeploymentRecord> {
        let entry = self.entries.get(&chain_id.to_string())?.get(contract)?;
        serde_json::from_value(entry.clone()).ok()
    }

    pub fn latest(&self, network_name: &str) -> Option<LatestDeployment> {
        let entry = self.entries.get(LATEST_KEY)?.get(network_name)?;
        serde_json::from_value(entry.clone()).ok()
    }

    /// Sets `[chain_id][contract]` and `_latest[record.network_name]`,
    /// leaving every other entry as it was.
    pub fn upsert(
        &mut self,
        chain_id: u64,
        contract: &str,
        record: DeploymentRecord,
    ) -> Result<(), serde_json::Error> {
        let latest = LatestDeployment {
            address: record.address,
            chain_id,
            contract: contract.to_string(),
            updated_at: record.deployed_at,
        };
        let network_name = record.network_name.clone();

        self.insert_nested(LATEST_KEY, network_name, serde_json::to_value(latest)?);
        self.insert_nested(&chain_id.to_string(), contract.to_string(), serde_json::to_value(record)?);
        Ok(())
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_nested(&mut self, key: &str, inner_key: String, value: Value) {
        let mut inner = match self.entries.remove(key) {
            Some(Value::Object(inner)) => inner,
            Some(other) => {
                tracing::warn!(key, replaced = %other, "Replacing non-object entry in deployment document");
                Map::new()
            }
            None => Map::new(),
        };
        inner.insert(inner_key, value);
        self.entries.insert(key.to_string(), Value::Object(inner));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn sample_record(chain_id: u64, network: &str) -> DeploymentRecord {
        DeploymentRecord {
            address: Address::from_low_u64_be(0x402),
            admin: Address::from_low_u64_be(0xad),
            network_name: network.to_string(),
            chain_id,
            deploy_tx: H256::from_low_u64_be(7),
            block_number: Some(12_345),
            deployed_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            explorer: Some("https://amoy.polygonscan.com".into()),
            constructor_args: vec![format!("{:?}", Address::from_low_u64_be(0xad))],
            implementation_note: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::sample_record;
    use super::*;
    use serde_json::json;

    fn contracts_on(doc: &DeploymentDocument, chain_id: &str) -> usize {
        doc.entries()[chain_id].as_object().map_or(0, Map::len)
    }

    #[test]
    fn upsert_overwrites_same_key() {
        let mut doc = DeploymentDocument::default();
        doc.upsert(80002, "X402Splitter", sample_record(80002, "polygonAmoyTestnet"))
            .unwrap();

        let mut redeploy = sample_record(80002, "polygonAmoyTestnet");
        redeploy.address = Address::from_low_u64_be(0x999);
        doc.upsert(80002, "X402Splitter", redeploy.clone()).unwrap();

        assert_eq!(doc.entries().len(), 2);
        assert_eq!(contracts_on(&doc, "80002"), 1);
        assert_eq!(doc.get(80002, "X402Splitter"), Some(redeploy.clone()));
        assert_eq!(
            doc.latest("polygonAmoyTestnet").unwrap().address,
            redeploy.address
        );
    }

    #[test]
    fn serializes_with_reserved_latest_key() {
        let mut doc = DeploymentDocument::default();
        doc.upsert(80002, "X402Splitter", sample_record(80002, "polygonAmoyTestnet"))
            .unwrap();

        let value = serde_json::to_value(&doc).unwrap();
        let record = &value["80002"]["X402Splitter"];
        assert_eq!(record["chainId"], 80002);
        assert_eq!(record["networkName"], "polygonAmoyTestnet");
        assert_eq!(record["blockNumber"], 12_345);
        assert!(record.get("deployTx").is_some());
        assert!(record.get("implementationNote").is_none());
        assert_eq!(value["_latest"]["polygonAmoyTestnet"]["contract"], "X402Splitter");
        assert_eq!(value["_latest"]["polygonAmoyTestnet"]["chainId"], 80002);
    }

    #[test]
    fn missing_block_number_is_null() {
        let mut record = sample_record(137, "polygonMainnet");
        record.block_number = None;
        record.explorer = None;
        let value = serde_json::to_value(&record).unwrap();
        assert!(value["blockNumber"].is_null());
        assert!(value["explorer"].is_null());
    }

    #[test]
    fn foreign_entries_survive_upsert() {
        let mut doc: DeploymentDocument = serde_json::from_value(json!({
            "137": { "PPVToken": { "address": "0xabc", "txHash": "0x01" } },
            "80002": { "Other": { "note": "hand written" } },
            "_latest": { "polygonMainnet": { "address": "0xabc" } },
            "comment": "kept"
        }))
        .unwrap();

        doc.upsert(80002, "X402Splitter", sample_record(80002, "polygonAmoyTestnet"))
            .unwrap();

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["137"]["PPVToken"]["txHash"], "0x01");
        assert_eq!(value["80002"]["Other"]["note"], "hand written");
        assert_eq!(value["_latest"]["polygonMainnet"]["address"], "0xabc");
        assert_eq!(value["comment"], "kept");
        assert!(doc.get(80002, "X402Splitter").is_some());
        assert!(doc.latest("polygonAmoyTestnet").is_some());
        // Present but not a record this crate understands.
        assert_eq!(doc.get(137, "PPVToken"), None);
        assert_eq!(doc.latest("polygonMainnet"), None);
    }

    #[test]
    fn non_object_chain_entry_is_replaced() {
        let mut doc: DeploymentDocument =
            serde_json::from_value(json!({ "80002": "stale", "_latest": [] })).unwrap();
        doc.upsert(80002, "X402Splitter", sample_record(80002, "polygonAmoyTestnet"))
            .unwrap();
        assert!(doc.get(80002, "X402Splitter").is_some());
        assert!(doc.latest("polygonAmoyTestnet").is_some());
    }

    #[test]
    fn parses_document_with_several_chains() {
        let mut doc = DeploymentDocument::default();
        doc.upsert(80002, "X402Splitter", sample_record(80002, "polygonAmoyTestnet"))
            .unwrap();
        doc.upsert(6342, "X402Splitter", sample_record(6342, "megaTestnet"))
            .unwrap();

        let json = serde_json::to_string_pretty(&doc).unwrap();
        let parsed: DeploymentDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
        assert_eq!(parsed.entries()[LATEST_KEY].as_object().map_or(0, Map::len), 2);
    }
}
