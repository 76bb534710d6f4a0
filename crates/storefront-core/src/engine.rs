//! Primary search client backed by Tantivy
//!
//! The engine is consumed through the `SearchEngine` trait so the
//! orchestrator can be tested against fakes and so a failing engine
//! can be swapped for the lexical fallback transparently.
//!
//! `ProductIndex` issues a single disjunctive query matching either
//! the original or the abbreviation-expanded form across weighted
//! fields (name over category), with typo-tolerant term matching and
//! an explicit boost clause for the caller's previously clicked
//! products. Hits carry highlighted snippets with `<strong>` markers
//! and are ordered by rating first, text relevance second.

use std::path::Path;

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Schema, Value, FAST, STORED, STRING, TEXT};
use tantivy::{Index, IndexWriter, ReloadPolicy, Snippet, SnippetGenerator, TantivyDocument, Term};

use crate::catalog::ProductRecord;
use crate::error::EngineError;
use crate::suggestion::{ProductTitle, Suggestion};

const NAME_BOOST: f32 = 2.0;
const CLICKED_ID_BOOST: f32 = 5.0;
const HIGHLIGHT_MAX_CHARS: usize = 250;

/// One query against the engine. Both query forms are probed in a
/// single disjunction; `boost_ids` are the caller's previously clicked
/// product ids.
#[derive(Debug, Clone)]
pub struct EngineQuery {
    pub original: String,
    pub expanded: String,
    pub boost_ids: Vec<String>,
    pub limit: usize,
}

/// A scored hit from either search path. Raw `name`/`category` feed
/// the ranker; the highlighted variants feed the response.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineHit {
    pub id: String,
    pub name: String,
    pub category: String,
    pub highlighted_name: Option<String>,
    pub highlighted_category: Option<String>,
    pub rating: f32,
    pub score: f32,
}

impl From<EngineHit> for Suggestion {
    fn from(hit: EngineHit) -> Self {
        Suggestion::Product {
            title: ProductTitle {
                long_title: hit.highlighted_name.unwrap_or_else(|| hit.name.clone()),
                short_title: hit
                    .highlighted_category
                    .unwrap_or_else(|| hit.category.clone()),
            },
            id: hit.id,
            rating: hit.rating,
        }
    }
}

/// Full-text search engine interface.
pub trait SearchEngine: Send + Sync {
    fn search(&self, query: &EngineQuery) -> Result<Vec<EngineHit>, EngineError>;
}

/// Tantivy-backed product index.
///
/// Schema:
/// - `id`: product identifier (STRING | STORED)
/// - `name`: product long title (TEXT | STORED), weighted above category
/// - `category`: product short title / category label (TEXT | STORED)
/// - `rating`: quality signal used as the primary sort key (FAST | STORED)
pub struct ProductIndex {
    index: Index,
    id_field: Field,
    name_field: Field,
    category_field: Field,
    rating_field: Field,
}

impl ProductIndex {
    fn schema() -> (Schema, Field, Field, Field, Field) {
        let mut schema_builder = Schema::builder();
        let id_field = schema_builder.add_text_field("id", STRING | STORED);
        let name_field = schema_builder.add_text_field("name", TEXT | STORED);
        let category_field = schema_builder.add_text_field("category", TEXT | STORED);
        let rating_field = schema_builder.add_f64_field("rating", FAST | STORED);
        let schema = schema_builder.build();
        (schema, id_field, name_field, category_field, rating_field)
    }

    /// Open or create an index at the given path.
    pub fn open_or_create(index_path: &Path) -> Result<Self, EngineError> {
        let (schema, id_field, name_field, category_field, rating_field) = Self::schema();

        let index = if index_path.exists() {
            Index::open_in_dir(index_path)?
        } else {
            std::fs::create_dir_all(index_path)
                .map_err(|e| EngineError::Unavailable(e.to_string()))?;
            Index::create_in_dir(index_path, schema)?
        };

        Ok(Self {
            index,
            id_field,
            name_field,
            category_field,
            rating_field,
        })
    }

    /// Create an in-memory index (for testing and seed-only setups).
    pub fn in_memory() -> Self {
        let (schema, id_field, name_field, category_field, rating_field) = Self::schema();
        let index = Index::create_in_ram(schema);
        Self {
            index,
            id_field,
            name_field,
            category_field,
            rating_field,
        }
    }

    /// Replace the index contents with the given products.
    pub fn index_products(&self, products: &[ProductRecord]) -> Result<(), EngineError> {
        let mut writer: IndexWriter = self.index.writer(50_000_000)?;
        writer.delete_all_documents()?;

        for product in products {
            let mut doc = TantivyDocument::new();
            doc.add_text(self.id_field, &product.id);
            doc.add_text(self.name_field, &product.long_title);
            doc.add_text(self.category_field, &product.short_title);
            doc.add_f64(self.rating_field, product.rating as f64);
            writer.add_document(doc)?;
        }

        writer.commit()?;
        Ok(())
    }

    fn build_query(&self, tokens: &[String], boost_ids: &[String]) -> Option<BooleanQuery> {
        if tokens.is_empty() && boost_ids.is_empty() {
            return None;
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for token in tokens {
            // Typo tolerance only for tokens long enough to carry it.
            let distance = if token.chars().count() >= 4 { 1 } else { 0 };

            let name_term = Term::from_field_text(self.name_field, token);
            let name_query = FuzzyTermQuery::new(name_term, distance, true);
            clauses.push((
                Occur::Should,
                Box::new(BoostQuery::new(Box::new(name_query), NAME_BOOST)),
            ));

            let category_term = Term::from_field_text(self.category_field, token);
            clauses.push((
                Occur::Should,
                Box::new(FuzzyTermQuery::new(category_term, distance, true)),
            ));
        }

        for id in boost_ids {
            let id_query = TermQuery::new(
                Term::from_field_text(self.id_field, id),
                IndexRecordOption::Basic,
            );
            clauses.push((
                Occur::Should,
                Box::new(BoostQuery::new(Box::new(id_query), CLICKED_ID_BOOST)),
            ));
        }

        Some(BooleanQuery::new(clauses))
    }

    /// Plain term disjunction over the query tokens. Fuzzy queries do
    /// not expose their terms to the snippet generator, so highlighting
    /// runs off this query instead of the retrieval one.
    fn highlight_query(&self, tokens: &[String]) -> BooleanQuery {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for token in tokens {
            for field in [self.name_field, self.category_field] {
                clauses.push((
                    Occur::Should,
                    Box::new(TermQuery::new(
                        Term::from_field_text(field, token),
                        IndexRecordOption::Basic,
                    )),
                ));
            }
        }
        BooleanQuery::new(clauses)
    }
}

/// Deduplicated whitespace tokens from both query forms.
fn query_tokens(query: &EngineQuery) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for form in [query.original.as_str(), query.expanded.as_str()] {
        for token in form.split_whitespace() {
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }
    }
    tokens
}

impl SearchEngine for ProductIndex {
    fn search(&self, query: &EngineQuery) -> Result<Vec<EngineHit>, EngineError> {
        let tokens = query_tokens(query);
        let Some(boolean_query) = self.build_query(&tokens, &query.boost_ids) else {
            return Ok(Vec::new());
        };

        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()?;
        let searcher = reader.searcher();

        // Overfetch so the rating-first reorder still sees the most
        // relevant documents.
        let fetch = query.limit.max(1) * 4;
        let top_docs = searcher.search(&boolean_query, &TopDocs::with_limit(fetch))?;

        let highlight_query = self.highlight_query(&tokens);
        let mut name_snippets =
            SnippetGenerator::create(&searcher, &highlight_query, self.name_field)?;
        name_snippets.set_max_num_chars(HIGHLIGHT_MAX_CHARS);
        let mut category_snippets =
            SnippetGenerator::create(&searcher, &highlight_query, self.category_field)?;
        category_snippets.set_max_num_chars(HIGHLIGHT_MAX_CHARS);

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address)?;

            let id = doc
                .get_first(self.id_field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let name = doc
                .get_first(self.name_field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let category = doc
                .get_first(self.category_field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let rating = doc
                .get_first(self.rating_field)
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0) as f32;

            let highlighted_name = wrap_snippet(&name_snippets.snippet_from_doc(&doc));
            let highlighted_category = wrap_snippet(&category_snippets.snippet_from_doc(&doc));

            hits.push(EngineHit {
                id,
                name,
                category,
                highlighted_name,
                highlighted_category,
                rating,
                score,
            });
        }

        // Quality signal first, text relevance second.
        hits.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    b.score
                        .partial_cmp(&a.score)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });
        hits.truncate(query.limit);

        Ok(hits)
    }
}

/// Rewrap a snippet's highlighted ranges in `<strong>` markers. Returns
/// None when the field had no match to highlight.
fn wrap_snippet(snippet: &Snippet) -> Option<String> {
    let ranges = snippet.highlighted();
    if ranges.is_empty() {
        return None;
    }
    let fragment = snippet.fragment();
    let mut out = String::with_capacity(fragment.len() + ranges.len() * 17);
    let mut cursor = 0;
    for range in ranges {
        out.push_str(&fragment[cursor..range.start]);
        out.push_str("<strong>");
        out.push_str(&fragment[range.start..range.end]);
        out.push_str("</strong>");
        cursor = range.end;
    }
    out.push_str(&fragment[cursor..]);
    Some(out)
}
