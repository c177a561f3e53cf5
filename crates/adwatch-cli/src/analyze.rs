//! The `analyze` command: check ad copy against the classifier's text
//! predicates without touching the archive or the store.

use adwatch_core::{infoproduct_keywords_in, matches_cta, INFOPRODUCT_KEYWORDS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CopyAnalysis {
    /// Vocabulary keywords found, in vocabulary order.
    pub keywords: Vec<&'static str>,
    /// `None` when no call to action was asked for.
    pub cta_found: Option<bool>,
}

impl CopyAnalysis {
    pub(crate) fn is_infoproduct(&self) -> bool {
        !self.keywords.is_empty()
    }
}

pub(crate) fn analyze_copy(text: &str, cta: Option<&str>) -> CopyAnalysis {
    CopyAnalysis {
        keywords: infoproduct_keywords_in(text, INFOPRODUCT_KEYWORDS),
        cta_found: cta
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| matches_cta(text, c)),
    }
}

pub(crate) fn run_analyze(text: &str, cta: Option<&str>) {
    let analysis = analyze_copy(text, cta);

    if analysis.is_infoproduct() {
        println!("keywords:    {}", analysis.keywords.join(", "));
        println!("infoproduct: yes");
    } else {
        println!("keywords:    none");
        println!("infoproduct: no (the fetch filter would reject this copy)");
    }

    match analysis.cta_found {
        Some(true) => println!("cta:         found"),
        Some(false) => println!("cta:         missing; add a clear call to action"),
        None => {}
    }
}
