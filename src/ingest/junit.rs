use super::types::{success_rate, CaseRecord, CaseStatus, SummaryRecord};
use crate::error::Error;
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// Parse a JUnit XML report file into a run summary and its test cases.
/// JUnit shape: optional <testsuites> root, a single <testsuite tests=".."
/// failures=".." errors=".." skipped=".." time="..">, zero or more <testcase>
/// children each carrying at most one of <failure>, <error>, <skipped>.
pub fn parse_junit_file(path: &Path) -> Result<(SummaryRecord, Vec<CaseRecord>), Error> {
    if !path.exists() {
        return Err(Error::InputMissing(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_junit_str(&content, path)
}

/// Parse JUnit XML content. `path` is only used for error messages.
pub fn parse_junit_str(
    content: &str,
    path: &Path,
) -> Result<(SummaryRecord, Vec<CaseRecord>), Error> {
    let mut reader = Reader::from_str(content);

    let mut suite: Option<SuiteCounts> = None;
    let mut cases: Vec<CaseRecord> = Vec::new();
    let mut drawn_ids: HashSet<String> = HashSet::new();
    let mut pending: Option<PendingCase> = None;
    let mut child: Option<StatusChild> = None;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"testsuite" if suite.is_none() => {
                    suite = Some(parse_suite_attrs(e, path)?);
                }
                b"testcase" if suite.is_some() => {
                    pending = Some(open_case(e, path)?);
                }
                b"failure" | b"error" | b"skipped" if pending.is_some() => {
                    child = Some(open_status_child(e, path)?);
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"testsuite" if suite.is_none() => {
                    // Self-closing suite has no cases
                    suite = Some(parse_suite_attrs(e, path)?);
                    break;
                }
                b"testcase" if suite.is_some() => {
                    cases.push(open_case(e, path)?.finish(&mut drawn_ids));
                }
                b"failure" | b"error" | b"skipped" => {
                    if let Some(case) = pending.as_mut() {
                        case.children.push(open_status_child(e, path)?);
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if let Some(c) = child.as_mut() {
                    let text = e.unescape().map_err(|err| malformed(path, err))?;
                    c.detail.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(c) = child.as_mut() {
                    c.detail.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"failure" | b"error" | b"skipped" => {
                    if let (Some(case), Some(done)) = (pending.as_mut(), child.take()) {
                        case.children.push(done);
                    }
                }
                b"testcase" => {
                    if let Some(open) = pending.take() {
                        cases.push(open.finish(&mut drawn_ids));
                    }
                }
                // Only the first suite is read
                b"testsuite" => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(path, e)),
            _ => {}
        }
        buf.clear();
    }

    let suite = suite.ok_or_else(|| schema(path, "no <testsuite> element found"))?;

    let consumed = suite.failures as u64 + suite.errors as u64 + suite.skipped as u64;
    if consumed > suite.tests as u64 {
        return Err(schema(path, "failures + errors + skipped exceed tests"));
    }
    let passed = suite.tests - consumed as u32;

    debug!(
        "parsed {}: {} cases, {} passed of {}",
        path.display(),
        cases.len(),
        passed,
        suite.tests
    );

    let summary = SummaryRecord {
        total: suite.tests,
        passed,
        failed: suite.failures,
        errors: suite.errors,
        skipped: suite.skipped,
        execution_time: suite.time,
        success_rate: success_rate(passed, suite.tests),
    };

    Ok((summary, cases))
}

/// Counts taken from the <testsuite> attributes
struct SuiteCounts {
    tests: u32,
    failures: u32,
    errors: u32,
    skipped: u32,
    time: f64,
}

/// A <testcase> whose children are still being read
struct PendingCase {
    name: String,
    class: String,
    time: f64,
    children: Vec<StatusChild>,
}

/// One <failure>, <error> or <skipped> child
struct StatusChild {
    status: CaseStatus,
    message: String,
    detail: String,
}

impl PendingCase {
    fn finish(self, drawn_ids: &mut HashSet<String>) -> CaseRecord {
        let (status, message, detail) = resolve_status(self.children);
        CaseRecord {
            id: draw_case_id(drawn_ids),
            name: self.name,
            class: self.class,
            status,
            time: self.time,
            message,
            detail,
        }
    }
}

/// Pick the winning status child. Precedence when a malformed case carries
/// several: failure, then error, then skipped; a bare case is passed.
fn resolve_status(children: Vec<StatusChild>) -> (CaseStatus, String, String) {
    for wanted in [CaseStatus::Failed, CaseStatus::Error, CaseStatus::Skipped] {
        if let Some(c) = children.iter().find(|c| c.status == wanted) {
            return (wanted, c.message.clone(), c.detail.trim().to_string());
        }
    }
    (CaseStatus::Passed, String::new(), String::new())
}

/// Draw a fresh 8-char hex id. Truncated UUIDs can collide within a run,
/// so redraw until unused.
fn draw_case_id(drawn_ids: &mut HashSet<String>) -> String {
    loop {
        let token = Uuid::new_v4().simple().to_string()[..8].to_string();
        if drawn_ids.insert(token.clone()) {
            return token;
        }
    }
}

fn parse_suite_attrs(e: &BytesStart, path: &Path) -> Result<SuiteCounts, Error> {
    let mut tests: Option<u32> = None;
    let mut failures: Option<u32> = None;
    let mut errors: Option<u32> = None;
    let mut skipped: Option<u32> = None;
    let mut time = 0.0;

    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(path, err))?;
        let value = attr.unescape_value().map_err(|err| malformed(path, err))?;
        match attr.key.as_ref() {
            b"tests" => tests = Some(parse_count(&value, "tests", path)?),
            b"failures" => failures = Some(parse_count(&value, "failures", path)?),
            b"errors" => errors = Some(parse_count(&value, "errors", path)?),
            b"skipped" => skipped = Some(parse_count(&value, "skipped", path)?),
            b"time" => time = parse_seconds(&value, "time", path)?,
            _ => {}
        }
    }

    match (tests, failures, errors, skipped) {
        (Some(tests), Some(failures), Some(errors), Some(skipped)) => Ok(SuiteCounts {
            tests,
            failures,
            errors,
            skipped,
            time,
        }),
        _ => Err(schema(
            path,
            "testsuite is missing one of tests/failures/errors/skipped",
        )),
    }
}

fn open_case(e: &BytesStart, path: &Path) -> Result<PendingCase, Error> {
    let mut name: Option<String> = None;
    let mut class: Option<String> = None;
    let mut time = 0.0;

    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(path, err))?;
        let value = attr.unescape_value().map_err(|err| malformed(path, err))?;
        match attr.key.as_ref() {
            b"name" => name = Some(value.into_owned()),
            b"classname" => class = Some(value.into_owned()),
            b"time" => time = parse_seconds(&value, "time", path)?,
            _ => {}
        }
    }

    match (name, class) {
        (Some(name), Some(class)) => Ok(PendingCase {
            name,
            class,
            time,
            children: Vec::new(),
        }),
        _ => Err(schema(path, "testcase is missing name or classname")),
    }
}

fn open_status_child(e: &BytesStart, path: &Path) -> Result<StatusChild, Error> {
    let status = match e.name().as_ref() {
        b"failure" => CaseStatus::Failed,
        b"error" => CaseStatus::Error,
        _ => CaseStatus::Skipped,
    };

    let mut message = String::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(path, err))?;
        if attr.key.as_ref() == b"message" {
            message = attr
                .unescape_value()
                .map_err(|err| malformed(path, err))?
                .into_owned();
        }
    }

    Ok(StatusChild {
        status,
        message,
        detail: String::new(),
    })
}

fn parse_count(raw: &str, attr: &str, path: &Path) -> Result<u32, Error> {
    raw.trim()
        .parse()
        .map_err(|_| schema(path, &format!("attribute {}={:?} is not a count", attr, raw)))
}

fn parse_seconds(raw: &str, attr: &str, path: &Path) -> Result<f64, Error> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        schema(
            path,
            &format!("attribute {}={:?} is not a number of seconds", attr, raw),
        )
    })?;
    Ok(value.max(0.0))
}

fn malformed(path: &Path, reason: impl std::fmt::Display) -> Error {
    Error::MalformedXml {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn schema(path: &Path, reason: &str) -> Error {
    Error::SchemaMismatch {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
