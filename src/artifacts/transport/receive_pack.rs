//! receive-pack protocol pieces: the ref advertisement, the set of objects
//! a push must carry, and the remote's report-status reply.

use crate::areas::database::Database;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::transport::pkt_line::{read_until_flush, Packet};
use crate::errors::RitError;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Read;

pub const RECEIVE_PACK_SERVICE: &str = "git-receive-pack";

/// Refs advertised by the remote, plus its capability list.
#[derive(Debug, Default)]
pub struct RefAdvertisement {
    pub refs: HashMap<String, ObjectId>,
    pub capabilities: Vec<String>,
}

impl RefAdvertisement {
    /// Parse a smart-HTTP `info/refs` response body. The body opens with a
    /// `# service=git-receive-pack` announcement and a flush, then the ref
    /// list; an empty repository advertises a `capabilities^{}` placeholder
    /// behind the null id.
    pub fn parse_http(reader: &mut impl Read) -> anyhow::Result<Self> {
        let announcement = read_until_flush(reader)?;
        let expected = format!("# service={RECEIVE_PACK_SERVICE}");
        let announced = announcement
            .first()
            .map(|line| String::from_utf8_lossy(line).trim_end().to_string());
        if announced.as_deref() != Some(expected.as_str()) {
            return Err(RitError::Protocol(format!(
                "unexpected service announcement {announced:?}"
            ))
            .into());
        }

        Self::parse_refs(reader)
    }

    /// Parse the ref advertisement itself (everything up to the flush).
    pub fn parse_refs(reader: &mut impl Read) -> anyhow::Result<Self> {
        let mut advertisement = RefAdvertisement::default();
        let mut first = true;

        for line in read_until_flush(reader)? {
            let line = String::from_utf8_lossy(&line).to_string();
            let line = line.trim_end_matches('\n');

            let (ref_part, caps) = match line.split_once('\0') {
                Some((ref_part, caps)) => (ref_part, Some(caps)),
                None => (line, None),
            };
            if first {
                if let Some(caps) = caps {
                    advertisement.capabilities = caps
                        .split_whitespace()
                        .map(|cap| cap.to_string())
                        .collect();
                }
                first = false;
            }

            let (oid_hex, ref_name) = ref_part
                .split_once(' ')
                .ok_or_else(|| RitError::Protocol(format!("malformed ref line '{line}'")))?;
            if ref_name == "capabilities^{}" {
                continue; // placeholder on an empty remote
            }
            let oid = ObjectId::try_parse(oid_hex.to_string())
                .map_err(|err| RitError::Protocol(format!("bad advertised id: {err}")))?;
            advertisement.refs.insert(ref_name.to_string(), oid);
        }

        Ok(advertisement)
    }
}

/// Everything reachable from `tip`: commits through their parent chain,
/// each commit's tree, and all nested trees and blobs. Walks are keyed by
/// id, so shared subtrees are visited once.
fn reachable_objects(
    database: &Database,
    tip: &ObjectId,
    out: &mut HashSet<ObjectId>,
) -> anyhow::Result<()> {
    let mut queue = VecDeque::from([tip.clone()]);

    while let Some(oid) = queue.pop_front() {
        if !out.insert(oid.clone()) {
            continue;
        }

        match database.parse_object(&oid)? {
            ObjectBox::Commit(commit) => {
                queue.push_back(commit.tree_oid().clone());
                for parent in commit.parents() {
                    queue.push_back(parent.clone());
                }
            }
            ObjectBox::Tree(tree) => {
                for (_, entry) in tree.entries() {
                    queue.push_back(entry.oid.clone());
                }
            }
            ObjectBox::Blob(_) => {}
        }
    }

    Ok(())
}

/// The objects reachable from `new_tip` but not from `old_tip`, which is
/// the pack payload of a push. An `old_tip` the local database does not
/// know (the remote is ahead) contributes nothing to the exclusion set.
pub fn missing_objects(
    database: &Database,
    new_tip: &ObjectId,
    old_tip: Option<&ObjectId>,
) -> anyhow::Result<Vec<ObjectId>> {
    let mut wanted = HashSet::new();
    reachable_objects(database, new_tip, &mut wanted)?;

    let mut known = HashSet::new();
    if let Some(old_tip) = old_tip {
        if database.contains(old_tip) {
            reachable_objects(database, old_tip, &mut known)?;
        }
    }

    let mut missing = wanted
        .into_iter()
        .filter(|oid| !known.contains(oid))
        .collect::<Vec<_>>();
    missing.sort();
    Ok(missing)
}

/// Per-ref outcome of a push, parsed from `report-status`.
#[derive(Debug, PartialEq, Eq)]
pub struct ReportStatus {
    pub unpack_ok: bool,
    /// `(ref name, rejection reason)`; `None` reason means the update
    /// succeeded
    pub ref_results: Vec<(String, Option<String>)>,
}

impl ReportStatus {
    pub fn parse(reader: &mut impl Read) -> anyhow::Result<Self> {
        let mut unpack_ok = false;
        let mut ref_results = Vec::new();

        loop {
            match crate::artifacts::transport::pkt_line::read_packet(reader)? {
                None => break,
                Some(Packet::Flush) => continue,
                Some(Packet::Line(line)) => {
                    let line = String::from_utf8_lossy(&line).trim_end().to_string();
                    if line == "unpack ok" {
                        unpack_ok = true;
                    } else if let Some(rest) = line.strip_prefix("unpack ") {
                        return Err(RitError::Protocol(format!("unpack failed: {rest}")).into());
                    } else if let Some(rest) = line.strip_prefix("ok ") {
                        ref_results.push((rest.to_string(), None));
                    } else if let Some(rest) = line.strip_prefix("ng ") {
                        let (ref_name, reason) =
                            rest.split_once(' ').unwrap_or((rest, "rejected"));
                        ref_results.push((ref_name.to_string(), Some(reason.to_string())));
                    }
                }
            }
        }

        Ok(ReportStatus {
            unpack_ok,
            ref_results,
        })
    }

    pub fn all_ok(&self) -> bool {
        self.unpack_ok
            && self
                .ref_results
                .iter()
                .all(|(_, rejection)| rejection.is_none())
    }
}
