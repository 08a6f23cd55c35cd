//! Module identity: manifests and capability declarations.

use std::fmt;

/// A `major.minor.patch` module version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemVer(u16, u16, u16);

impl SemVer {
    /// Assemble a version.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self(major, minor, patch)
    }

    /// Major component.
    #[must_use]
    pub const fn major(&self) -> u16 {
        self.0
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(&self) -> u16 {
        self.1
    }

    /// Patch component.
    #[must_use]
    pub const fn patch(&self) -> u16 {
        self.2
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}

/// What a module declares it can do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Speaks the HTTP protocol.
    HttpProtocol,

    /// Resolves requests against a route table.
    RouteResolution,

    /// Propagates trace context across network hops.
    TraceContextPropagation,

    /// Retains ended spans for export.
    SpanExport,

    /// Anything not covered by the fixed set.
    Custom(String),
}

/// A module's identity card: name, version, and capabilities.
#[derive(Debug, Clone)]
pub struct ModuleManifest {
    /// Unique module name.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Module version.
    pub version: SemVer,

    /// Declared capabilities, in declaration order.
    pub capabilities: Vec<Capability>,
}

impl ModuleManifest {
    /// Start building a manifest for the named module.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ModuleManifestBuilder {
        ModuleManifestBuilder {
            name: name.into(),
            description: String::new(),
            version: SemVer::new(0, 1, 0),
            capabilities: Vec::new(),
        }
    }

    /// Whether the module declared the given capability.
    #[must_use]
    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Builder for [`ModuleManifest`].
#[derive(Debug)]
pub struct ModuleManifestBuilder {
    name: String,
    description: String,
    version: SemVer,
    capabilities: Vec<Capability>,
}

impl ModuleManifestBuilder {
    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the version.
    #[must_use]
    pub fn version(mut self, major: u16, minor: u16, patch: u16) -> Self {
        self.version = SemVer::new(major, minor, patch);
        self
    }

    /// Declare a capability. Duplicate declarations collapse to one.
    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    /// Finish the manifest.
    #[must_use]
    pub fn build(self) -> ModuleManifest {
        ModuleManifest {
            name: self.name,
            description: self.description,
            version: self.version,
            capabilities: self.capabilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_builder() {
        let manifest = ModuleManifest::builder("http-server")
            .description("HTTP/1.1 server")
            .version(1, 2, 3)
            .capability(Capability::HttpProtocol)
            .capability(Capability::RouteResolution)
            .build();

        assert_eq!(manifest.name, "http-server");
        assert_eq!(manifest.version, SemVer::new(1, 2, 3));
        assert!(manifest.has_capability(&Capability::HttpProtocol));
        assert!(!manifest.has_capability(&Capability::SpanExport));
    }

    #[test]
    fn test_duplicate_capabilities_collapse() {
        let manifest = ModuleManifest::builder("m")
            .capability(Capability::SpanExport)
            .capability(Capability::SpanExport)
            .build();
        assert_eq!(manifest.capabilities.len(), 1);
    }

    #[test]
    fn test_semver_display() {
        let version = SemVer::new(1, 0, 9);
        assert_eq!(version.to_string(), "1.0.9");
        assert_eq!(version.major(), 1);
        assert_eq!(version.patch(), 9);
    }

    #[test]
    fn test_custom_capability() {
        let manifest = ModuleManifest::builder("tracer")
            .capability(Capability::Custom("W3CTraceContext".to_string()))
            .build();
        assert!(manifest.has_capability(&Capability::Custom("W3CTraceContext".to_string())));
    }
}
