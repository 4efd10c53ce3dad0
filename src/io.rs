//! Text serialization of families.
//!
//! # File Format
//!
//! ```text
//! zdd <node_count>
//! N <id> <elem> <lo> <hi>   # decision node
//! R <ref>                   # root
//! ```
//!
//! Nodes appear bottom-up (children before parents), numbered from 0 in
//! post-order with the lo subtree visited before the hi subtree. A `<ref>` is
//! `F` (⊥), `T` (⊤) or the id of a node defined above. Lines starting with `c`
//! are comments.
//!
//! Node ids depend only on the family, never on manager addresses, so equal
//! families always dump to identical text.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::reference::ZddId;
use crate::types::Elem;
use crate::zdd::ZddManager;

impl ZddManager {
    /// Writes `f` to `writer` in text format.
    pub fn dump(&self, f: ZddId, mut writer: impl io::Write) -> Result<()> {
        writer.write_all(self.dumps(f).as_bytes())?;
        Ok(())
    }

    /// Saves `f` to a file in text format.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use setset_rs::zdd::ZddManager;
    ///
    /// let mgr = ZddManager::new();
    /// let f = mgr.powerset([1, 2, 3]).unwrap();
    /// mgr.save(f, "family.zdd").unwrap();
    /// ```
    pub fn save<P: AsRef<Path>>(&self, f: ZddId, path: P) -> Result<()> {
        fs::write(path, self.dumps(f))?;
        Ok(())
    }

    /// Converts `f` to text format.
    pub fn dumps(&self, f: ZddId) -> String {
        let mut positions: HashMap<ZddId, usize> = HashMap::new();
        let mut node_lines = String::new();
        self.collect_nodes(f, &mut positions, &mut node_lines);

        let mut output = String::new();
        writeln!(output, "c zdd nodes appear bottom-up, children before parents").unwrap();
        writeln!(output, "zdd {}", positions.len()).unwrap();
        output.push_str(&node_lines);
        writeln!(output, "R {}", reference(f, &positions)).unwrap();
        output
    }

    fn collect_nodes(&self, f: ZddId, positions: &mut HashMap<ZddId, usize>, node_lines: &mut String) {
        if f.is_terminal() || positions.contains_key(&f) {
            return;
        }

        let node = self.node(f);
        self.collect_nodes(node.lo, positions, node_lines);
        self.collect_nodes(node.hi, positions, node_lines);

        let id = positions.len();
        positions.insert(f, id);
        writeln!(
            node_lines,
            "N {} {} {} {}",
            id,
            node.elem,
            reference(node.lo, positions),
            reference(node.hi, positions)
        )
        .unwrap();
    }

    /// Reads a family in text format from `reader`.
    pub fn load(&self, reader: impl BufRead) -> Result<ZddId> {
        let mut lines = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('c') {
                continue;
            }
            lines.push((i + 1, trimmed.to_string()));
        }
        self.parse(&lines)
    }

    /// Loads a family from a file in text format.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<ZddId> {
        let content = fs::read_to_string(path)?;
        self.loads(&content)
    }

    /// Parses a family from a string in text format.
    pub fn loads(&self, content: &str) -> Result<ZddId> {
        self.load(content.as_bytes())
    }

    fn parse(&self, lines: &[(usize, String)]) -> Result<ZddId> {
        let mut lines = lines.iter();
        let mut last_line = 0;

        // Parse header
        let (line_no, header) = lines.next().ok_or_else(|| Error::format(1, "missing header"))?;
        last_line = last_line.max(*line_no);
        let parts: Vec<&str> = header.split_whitespace().collect();
        if parts.len() != 2 || parts[0] != "zdd" {
            return Err(Error::format(*line_no, format!("invalid header: {}", header)));
        }
        let node_count: usize = parts[1]
            .parse()
            .map_err(|_| Error::format(*line_no, format!("invalid node count: {}", parts[1])))?;

        // Parse nodes; the count is untrusted, so grow as lines arrive
        let mut nodes: Vec<ZddId> = Vec::new();
        for expected in 0..node_count {
            let (line_no, line) = lines
                .next()
                .ok_or_else(|| Error::format(last_line + 1, format!("expected {} nodes, found {}", node_count, expected)))?;
            last_line = *line_no;
            nodes.push(self.parse_node(*line_no, line, expected, &nodes)?);
        }

        // Parse root
        let (line_no, line) = lines
            .next()
            .ok_or_else(|| Error::format(last_line + 1, "missing root line"))?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 || parts[0] != "R" {
            return Err(Error::format(*line_no, format!("expected root line, got: {}", line)));
        }
        let root = resolve(*line_no, parts[1], &nodes)?;

        if let Some((line_no, line)) = lines.next() {
            return Err(Error::format(*line_no, format!("trailing input: {}", line)));
        }

        debug!("loaded {} nodes, root {}", nodes.len(), root);
        Ok(root)
    }

    fn parse_node(&self, line_no: usize, line: &str, expected: usize, nodes: &[ZddId]) -> Result<ZddId> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 5 || parts[0] != "N" {
            return Err(Error::format(line_no, format!("expected node line, got: {}", line)));
        }

        let id: usize = parts[1]
            .parse()
            .map_err(|_| Error::format(line_no, format!("invalid node id: {}", parts[1])))?;
        if id != expected {
            return Err(Error::format(line_no, format!("expected node id {}, got {}", expected, id)));
        }

        let elem: u64 = parts[2]
            .parse()
            .map_err(|_| Error::format(line_no, format!("invalid element: {}", parts[2])))?;
        let elem: Elem = self.admit(elem).map_err(|e| Error::format(line_no, e.to_string()))?;

        let lo = resolve(line_no, parts[3], nodes)?;
        let hi = resolve(line_no, parts[4], nodes)?;
        if hi.is_zero() {
            return Err(Error::format(line_no, "hi child cannot be F"));
        }
        for child in [lo, hi] {
            if self.top(child) <= elem.id() {
                return Err(Error::format(
                    line_no,
                    format!("element {} is not above its child at element {}", elem, self.top(child)),
                ));
            }
        }

        Ok(self.get_node(elem, lo, hi))
    }
}

fn reference(f: ZddId, positions: &HashMap<ZddId, usize>) -> String {
    if f.is_zero() {
        "F".to_string()
    } else if f.is_one() {
        "T".to_string()
    } else {
        positions[&f].to_string()
    }
}

fn resolve(line_no: usize, token: &str, nodes: &[ZddId]) -> Result<ZddId> {
    match token {
        "F" => Ok(ZddId::ZERO),
        "T" => Ok(ZddId::ONE),
        _ => {
            let id: usize = token
                .parse()
                .map_err(|_| Error::format(line_no, format!("invalid reference: {}", token)))?;
            nodes
                .get(id)
                .copied()
                .ok_or_else(|| Error::format(line_no, format!("reference to undefined node {}", id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::universe::Universe;

    #[test]
    fn test_dumps_format() {
        let mgr = ZddManager::new();
        let f = mgr.from_sets(vec![vec![1], vec![2]]).unwrap();
        let text = mgr.dumps(f);
        let body: Vec<&str> = text.lines().filter(|l| !l.starts_with('c')).collect();
        assert_eq!(body, vec!["zdd 2", "N 0 2 F T", "N 1 1 0 T", "R 1"]);
    }

    #[test]
    fn test_terminal_roundtrip() {
        let mgr = ZddManager::new();
        for f in [ZddId::ZERO, ZddId::ONE] {
            let text = mgr.dumps(f);
            assert_eq!(mgr.loads(&text).unwrap(), f);
        }
        assert!(mgr.dumps(ZddId::ONE).ends_with("zdd 0\nR T\n"));
    }

    #[test]
    fn test_roundtrip_is_stable() {
        let mgr = ZddManager::new();
        let f = mgr
            .from_sets(vec![vec![1, 3], vec![2, 3, 5], vec![], vec![4], vec![1, 2, 3, 4, 5]])
            .unwrap();
        let text = mgr.dumps(f);
        assert_eq!(mgr.loads(&text).unwrap(), f);

        // A fresh manager builds the same text back
        let other = ZddManager::new();
        let g = other.loads(&text).unwrap();
        assert_eq!(other.dumps(g), text);
    }

    #[test]
    fn test_dump_to_writer() {
        let mgr = ZddManager::new();
        let f = mgr.powerset([1, 2]).unwrap();
        let mut buf = Vec::new();
        mgr.dump(f, &mut buf).unwrap();
        assert_eq!(mgr.load(buf.as_slice()).unwrap(), f);
    }

    fn format_line(mgr: &ZddManager, text: &str) -> usize {
        match mgr.loads(text) {
            Err(Error::Format { line, .. }) => line,
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_malformed_input() {
        let mgr = ZddManager::with_universe(Universe::new(10).unwrap());

        assert_eq!(format_line(&mgr, ""), 1);
        assert_eq!(format_line(&mgr, "bdd 1\n"), 1);
        assert_eq!(format_line(&mgr, "zdd x\n"), 1);
        // Truncated
        assert_eq!(format_line(&mgr, "zdd 2\nN 0 2 F T\n"), 3);
        assert_eq!(format_line(&mgr, "zdd 1\nN 0 2 F T\n"), 3);
        // Node count far beyond the input
        assert_eq!(format_line(&mgr, "zdd 18446744073709551615\nR T\n"), 2);
        assert_eq!(format_line(&mgr, "zdd 4294967296\n"), 2);
        // Wrong id sequence
        assert_eq!(format_line(&mgr, "zdd 1\nN 1 2 F T\nR 0\n"), 2);
        // Undefined reference
        assert_eq!(format_line(&mgr, "zdd 1\nN 0 2 F 3\nR 0\n"), 2);
        assert_eq!(format_line(&mgr, "zdd 1\nN 0 2 F T\nR 1\n"), 3);
        // Element out of range
        assert_eq!(format_line(&mgr, "zdd 1\nN 0 11 F T\nR 0\n"), 2);
        assert_eq!(format_line(&mgr, "zdd 1\nN 0 0 F T\nR 0\n"), 2);
        // hi = F
        assert_eq!(format_line(&mgr, "zdd 1\nN 0 2 T F\nR 0\n"), 2);
        // Unordered
        assert_eq!(format_line(&mgr, "zdd 2\nN 0 2 F T\nN 1 3 0 T\nR 1\n"), 3);
        // Trailing garbage
        assert_eq!(format_line(&mgr, "zdd 0\nR T\nR F\n"), 3);
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let mgr = ZddManager::new();
        let f = mgr.loads("c a family\n\nzdd 1\nN 0 4 T T\n\nR 0\n").unwrap();
        assert_eq!(f, mgr.powerset([4]).unwrap());
    }
}
