//! Curies used by generated statements, and the default prefix map.

pub const RDF_TYPE: &str = "rdf:type";
pub const RDFS_LABEL: &str = "rdfs:label";
pub const RDFS_SUBCLASS_OF: &str = "rdfs:subClassOf";

pub const OWL_CLASS: &str = "owl:Class";
pub const OWL_AXIOM: &str = "owl:Axiom";
pub const OWL_ANNOTATED_SOURCE: &str = "owl:annotatedSource";
pub const OWL_ANNOTATED_PROPERTY: &str = "owl:annotatedProperty";
pub const OWL_ANNOTATED_TARGET: &str = "owl:annotatedTarget";

pub const XSD_STRING: &str = "xsd:string";

pub const OIO_HAS_EXACT_SYNONYM: &str = "oio:hasExactSynonym";
pub const OIO_HAS_RELATED_SYNONYM: &str = "oio:hasRelatedSynonym";
pub const OIO_HAS_BROAD_SYNONYM: &str = "oio:hasBroadSynonym";
pub const OIO_HAS_SYNONYM_TYPE: &str = "oio:hasSynonymType";
pub const OIO_HAS_DBXREF: &str = "oio:hasDbXref";
pub const OIO_HAS_ALTERNATIVE_ID: &str = "oio:hasAlternativeId";
pub const OIO_HAS_OBO_NAMESPACE: &str = "oio:hasOBONamespace";

pub const NCBITAXON_HAS_RANK: &str = "ncbitaxon:has_rank";

/// Display-only link to the external taxonomy browser.
pub const BROWSER_LINK: &str = "iedb:browser-link";
pub const BROWSER_IRI_BASE: &str = "http://www.ncbi.nlm.nih.gov/Taxonomy/Browser/wwwtax.cgi?id=";

/// Ranks emitted as IRIs rather than curies, for compatibility with older data.
pub const LEGACY_RANK_IRI_BASE: &str = "http://purl.obolibrary.org/obo/NCBITaxon#_";
pub const LEGACY_IRI_RANKS: [&str; 2] = ["species_group", "species_subgroup"];

pub const OBO_NAMESPACE: &str = "ncbi_taxonomy";

pub const TAXON_PREFIX: &str = "NCBITaxon";
pub const ROOT_TAX_ID: &str = "1";

/// Prefixes known without a prefixes table.
pub const DEFAULT_PREFIXES: &[(&str, &str)] = &[
    ("NCBITaxon", "http://purl.obolibrary.org/obo/NCBITaxon_"),
    ("ncbitaxon", "http://purl.obolibrary.org/obo/ncbitaxon#"),
    ("oio", "http://www.geneontology.org/formats/oboInOwl#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
];

/// `NCBITaxon:{tax_id}`
pub fn taxon_curie(tax_id: &str) -> String {
    format!("{TAXON_PREFIX}:{tax_id}")
}

/// Turn a free-text rank or name class into an id fragment
/// (`"species group"` → `"species_group"`).
pub fn label_to_id(text: &str) -> String {
    text.replace([' ', '-'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxon_curie_uses_the_obo_prefix() {
        assert_eq!(taxon_curie("562"), "NCBITaxon:562");
        assert_eq!(taxon_curie(ROOT_TAX_ID), "NCBITaxon:1");
    }

    #[test]
    fn label_to_id_replaces_spaces_and_hyphens() {
        assert_eq!(label_to_id("species subgroup"), "species_subgroup");
        assert_eq!(label_to_id("in-part"), "in_part");
    }
}
