use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::endpoint::EndpointPath;
use crate::path::BarePart;
use crate::pattern::ByteClass;

/// Failure while building the dispatch tree.
#[derive(Debug, Error)]
pub enum RouteTreeError {
    #[error("empty endpoint path parts")]
    EmptyPath,
    #[error("duplicate endpoint path at {0}")]
    DuplicatePath(String),
    #[error("capture part [{part}] has intersection with existing child node: {node}")]
    AmbiguousCapture { part: String, node: String },
    #[error("split on non-fixed path part")]
    SplitNonFixed,
    #[error("cannot add endpoint path {path}: {source}")]
    Import {
        path: String,
        #[source]
        source: Box<RouteTreeError>,
    },
}

/// Node in the dispatch prefix tree.
///
/// Each node matches one path part: literal bytes for Fixed nodes, one
/// byte-class position for Capture nodes. A node whose subtree terminates an
/// endpoint path carries that path as its leaf. Route metadata is shared via
/// `Arc` so the tree holds stable snapshots of the registered rows.
#[derive(Debug, Clone)]
pub struct RadixNode {
    depth: usize,
    part: BarePart,
    children: Vec<RadixNode>,
    leaf: Option<Arc<EndpointPath>>,
}

impl fmt::Display for RadixNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[depth={}, part={}, leaf=", self.depth, self.part)?;
        match &self.leaf {
            Some(endpoint_path) => write!(f, "{endpoint_path}")?,
            None => f.write_str("<none>")?,
        }
        f.write_str("]")
    }
}

impl RadixNode {
    /// Root node: depth 0 with an empty Fixed part.
    pub fn new_root() -> Self {
        Self {
            depth: 0,
            part: BarePart::Fixed(Vec::new()),
            children: Vec::new(),
            leaf: None,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn part(&self) -> &BarePart {
        &self.part
    }

    pub fn children(&self) -> &[RadixNode] {
        &self.children
    }

    pub fn leaf(&self) -> Option<&Arc<EndpointPath>> {
        self.leaf.as_ref()
    }

    /// Insert one endpoint path, walking its bare parts from this node down.
    pub fn add_endpoint_path(&mut self, path: Arc<EndpointPath>) -> Result<(), RouteTreeError> {
        if path.bare_path.parts.is_empty() {
            return Err(RouteTreeError::EmptyPath);
        }
        let parts = path.bare_path.parts.clone();
        self.insert_child_part(&parts[0], &parts[1..], path)
    }

    /// Insert a batch of endpoint paths, wrapping the first failure with the
    /// offending path's description.
    pub fn import_paths<I>(&mut self, paths: I) -> Result<(), RouteTreeError>
    where
        I: IntoIterator<Item = Arc<EndpointPath>>,
    {
        for path in paths {
            let described = path.to_string();
            self.add_endpoint_path(path)
                .map_err(|err| RouteTreeError::Import {
                    path: described,
                    source: Box::new(err),
                })?;
        }
        Ok(())
    }

    fn insert_child_part(
        &mut self,
        part: &BarePart,
        remaining: &[BarePart],
        path: Arc<EndpointPath>,
    ) -> Result<(), RouteTreeError> {
        match part {
            BarePart::Fixed(bytes) => self.insert_fixed_child(bytes, remaining, path),
            BarePart::Capture(pattern) => self.insert_capture_child(pattern, remaining, path),
        }
    }

    /// Longest common byte prefix between this node's Fixed part and `bytes`;
    /// zero when either side is not Fixed.
    fn common_prefix_len(&self, bytes: &[u8]) -> usize {
        let BarePart::Fixed(own) = &self.part else {
            return 0;
        };
        own.iter()
            .zip(bytes.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    fn fixed_len(&self) -> usize {
        match &self.part {
            BarePart::Fixed(bytes) => bytes.len(),
            BarePart::Capture(_) => 0,
        }
    }

    fn insert_fixed_child(
        &mut self,
        bytes: &[u8],
        remaining: &[BarePart],
        path: Arc<EndpointPath>,
    ) -> Result<(), RouteTreeError> {
        for child in &mut self.children {
            let common = child.common_prefix_len(bytes);
            if common == 0 {
                continue;
            }
            // Shared prefix shorter than the sibling's bytes: split it so the
            // prefix becomes its own node.
            if common < child.fixed_len() {
                child.split_at(common)?;
            }
            if common == bytes.len() {
                if remaining.is_empty() {
                    if child.leaf.is_some() {
                        return Err(RouteTreeError::DuplicatePath(child.to_string()));
                    }
                    child.leaf = Some(path);
                    return Ok(());
                }
                return child.insert_child_part(&remaining[0], &remaining[1..], path);
            }
            let suffix = BarePart::Fixed(bytes[common..].to_vec());
            child.append_child_chain(suffix, remaining, path);
            return Ok(());
        }
        self.append_child_chain(BarePart::Fixed(bytes.to_vec()), remaining, path);
        Ok(())
    }

    fn insert_capture_child(
        &mut self,
        pattern: &ByteClass,
        remaining: &[BarePart],
        path: Arc<EndpointPath>,
    ) -> Result<(), RouteTreeError> {
        for child in &mut self.children {
            let existing = match &child.part {
                BarePart::Capture(existing) => *existing,
                BarePart::Fixed(_) => continue,
            };
            if existing == *pattern {
                if remaining.is_empty() {
                    if child.leaf.is_some() {
                        return Err(RouteTreeError::DuplicatePath(child.to_string()));
                    }
                    child.leaf = Some(path);
                    return Ok(());
                }
                return child.insert_child_part(&remaining[0], &remaining[1..], path);
            }
            if existing.intersects(pattern) {
                return Err(RouteTreeError::AmbiguousCapture {
                    part: BarePart::Capture(*pattern).canonical_text(),
                    node: child.to_string(),
                });
            }
        }
        self.append_child_chain(BarePart::Capture(*pattern), remaining, path);
        Ok(())
    }

    /// Split this Fixed node at `common`: the node keeps the prefix, a new
    /// child inherits the suffix together with the original children and
    /// leaf. Every descendant moves one level down.
    fn split_at(&mut self, common: usize) -> Result<(), RouteTreeError> {
        let BarePart::Fixed(bytes) = &mut self.part else {
            return Err(RouteTreeError::SplitNonFixed);
        };
        let suffix = bytes[common..].to_vec();
        bytes.truncate(common);
        let mut moved = RadixNode {
            depth: self.depth + 1,
            part: BarePart::Fixed(suffix),
            children: std::mem::take(&mut self.children),
            leaf: self.leaf.take(),
        };
        for child in &mut moved.children {
            child.increase_depth();
        }
        self.children = vec![moved];
        Ok(())
    }

    fn increase_depth(&mut self) {
        self.depth += 1;
        for child in &mut self.children {
            child.increase_depth();
        }
    }

    /// Append `first` plus the remaining parts as a fresh single-branch chain
    /// under this node, terminating in a leaf. The caller has already checked
    /// that `first` shares nothing with the existing children.
    fn append_child_chain(
        &mut self,
        first: BarePart,
        remaining: &[BarePart],
        path: Arc<EndpointPath>,
    ) {
        let first_depth = self.depth + 1;
        let mut tail: Option<RadixNode> = None;
        for (offset, part) in remaining.iter().enumerate().rev() {
            let mut node = RadixNode {
                depth: first_depth + offset + 1,
                part: part.clone(),
                children: Vec::new(),
                leaf: None,
            };
            match tail.take() {
                Some(child) => node.children.push(child),
                None => node.leaf = Some(Arc::clone(&path)),
            }
            tail = Some(node);
        }
        let mut head = RadixNode {
            depth: first_depth,
            part: first,
            children: Vec::new(),
            leaf: None,
        };
        match tail {
            Some(child) => head.children.push(child),
            None => head.leaf = Some(path),
        }
        self.children.push(head);
    }
}
