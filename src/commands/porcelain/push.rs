use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::transport::pack::build_pack;
use crate::artifacts::transport::pkt_line::{write_flush, write_pkt_line};
use crate::artifacts::transport::receive_pack::{
    missing_objects, RefAdvertisement, ReportStatus, RECEIVE_PACK_SERVICE,
};
use crate::errors::RitError;
use std::io::Write;
use std::time::Duration;

const DEFAULT_REMOTE: &str = "origin";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const TIMEOUT_ENV: &str = "RIT_HTTP_TIMEOUT";

impl Repository {
    /// Push a branch over smart HTTP: learn the remote's refs, send the
    /// ref update plus a pack of the objects the remote lacks, and check
    /// its report-status. Local refs are never mutated.
    pub fn push(&self, remote: Option<&str>, branch: Option<&str>) -> anyhow::Result<()> {
        let remote_name = remote.unwrap_or(DEFAULT_REMOTE);
        let url = self.config()?.remote_url(remote_name)?;

        let branch = match branch {
            Some(name) => BranchName::try_parse(name)?,
            None => self.refs().current_branch()?.ok_or_else(|| {
                anyhow::anyhow!("HEAD is detached; name the branch to push")
            })?,
        };
        let new_oid = self
            .refs()
            .read_branch(&branch)?
            .ok_or_else(|| anyhow::anyhow!("branch '{branch}' has no commits"))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(http_timeout_secs()))
            .build()
            .map_err(|err| RitError::Protocol(format!("building HTTP client: {err}")))?;

        let advertisement = self.fetch_ref_advertisement(&client, &url)?;

        let ref_name = branch.ref_path();
        let old_oid = advertisement.refs.get(&ref_name).cloned();
        if old_oid.as_ref() == Some(&new_oid) {
            writeln!(self.writer(), "everything up to date")?;
            return Ok(());
        }

        let objects = missing_objects(self.database(), &new_oid, old_oid.as_ref())?;
        let pack = build_pack(self.database(), &objects)?;

        let mut body = Vec::new();
        let old_hex = old_oid.unwrap_or_else(ObjectId::zero);
        write_pkt_line(
            &mut body,
            format!("{old_hex} {new_oid} {ref_name}\0report-status\n").as_bytes(),
        )?;
        write_flush(&mut body)?;
        body.extend_from_slice(&pack);

        let response = client
            .post(format!("{url}/{RECEIVE_PACK_SERVICE}"))
            .header(
                "Content-Type",
                format!("application/x-{RECEIVE_PACK_SERVICE}-request"),
            )
            .header(
                "Accept",
                format!("application/x-{RECEIVE_PACK_SERVICE}-result"),
            )
            .body(body)
            .send()
            .map_err(|err| RitError::Protocol(format!("posting pack: {err}")))?;

        if !response.status().is_success() {
            return Err(
                RitError::Protocol(format!("remote answered {}", response.status())).into(),
            );
        }

        let bytes = response
            .bytes()
            .map_err(|err| RitError::Protocol(format!("reading report-status: {err}")))?;
        let report = ReportStatus::parse(&mut std::io::Cursor::new(bytes))?;

        if !report.all_ok() {
            let rejected = report
                .ref_results
                .iter()
                .filter_map(|(ref_name, rejection)| {
                    rejection
                        .as_ref()
                        .map(|reason| format!("{ref_name}: {reason}"))
                })
                .collect::<Vec<_>>()
                .join(", ");
            return Err(RitError::Protocol(format!("push rejected ({rejected})")).into());
        }

        writeln!(
            self.writer(),
            "pushed '{branch}' to {remote_name} ({} objects, {})",
            objects.len(),
            new_oid.to_short_oid()
        )?;
        Ok(())
    }

    fn fetch_ref_advertisement(
        &self,
        client: &reqwest::blocking::Client,
        url: &str,
    ) -> anyhow::Result<RefAdvertisement> {
        let response = client
            .get(format!("{url}/info/refs?service={RECEIVE_PACK_SERVICE}"))
            .send()
            .map_err(|err| RitError::Protocol(format!("fetching remote refs: {err}")))?;

        if !response.status().is_success() {
            return Err(
                RitError::Protocol(format!("remote answered {}", response.status())).into(),
            );
        }

        let bytes = response
            .bytes()
            .map_err(|err| RitError::Protocol(format!("reading remote refs: {err}")))?;
        RefAdvertisement::parse_http(&mut std::io::Cursor::new(bytes))
    }
}

fn http_timeout_secs() -> u64 {
    std::env::var(TIMEOUT_ENV)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}
