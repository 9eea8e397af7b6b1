use crate::domain::model::{BirdRecord, SpeciesGroup};
use crate::utils::error::{ExplorerError, Result};
use std::collections::{HashMap, HashSet};

/// Sort records by the concatenated species+name key. `sort_by` is stable,
/// so records with equal keys keep their fetch order.
pub fn sort_birds(mut birds: Vec<BirdRecord>) -> Vec<BirdRecord> {
    birds.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    birds
}

/// Distinct scientific names in first-occurrence order. Order-preserving
/// dedup, not a set.
pub fn species_in_order(birds: &[BirdRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut species = Vec::new();
    for bird in birds {
        if seen.insert(bird.scientific_name.as_str()) {
            species.push(bird.scientific_name.clone());
        }
    }
    species
}

/// One group per distinct species, each holding the option markup of its
/// records. Options carry the record's position in the globally sorted
/// sequence as their value, so grouping never reorders or renumbers them.
pub fn build_species_groups(birds: &[BirdRecord]) -> Result<Vec<SpeciesGroup>> {
    let species = species_in_order(birds);
    let mut slots: HashMap<&str, usize> = HashMap::with_capacity(species.len());
    let mut groups: Vec<SpeciesGroup> = Vec::with_capacity(species.len());
    for name in &species {
        slots.insert(name.as_str(), groups.len());
        groups.push(SpeciesGroup {
            scientific_name: name.clone(),
            options: String::new(),
        });
    }

    for (position, bird) in birds.iter().enumerate() {
        let slot = *slots.get(bird.scientific_name.as_str()).ok_or_else(|| {
            ExplorerError::ProcessingError {
                message: format!("no species group for '{}'", bird.scientific_name),
            }
        })?;
        groups[slot].options.push_str(&format!(
            "<option value=\"{}\">{}</option>",
            position,
            escape_html(&bird.bird_name)
        ));
    }

    Ok(groups)
}

/// The optgroup fragment for the select container.
pub fn render_opt_groups(birds: &[BirdRecord]) -> Result<String> {
    let groups = build_species_groups(birds)?;
    let mut html = String::new();
    for group in &groups {
        html.push_str(&format!(
            "<optgroup label=\"{}\">",
            escape_html(&group.scientific_name)
        ));
        html.push_str(&group.options);
        html.push_str("</optgroup>");
    }
    Ok(html)
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Minimal page skeleton holding an empty select container.
pub fn empty_page(container_id: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Bird tracking explorer</title></head>\n<body>\n\
         <select id=\"{}\"></select>\n</body>\n</html>\n",
        escape_html(container_id)
    )
}

/// Insert `fragment` just before the container's closing tag. Appending is
/// cumulative: a second call with the same fragment yields two copies.
pub fn append_to_container(page: &str, container_id: &str, fragment: &str) -> Result<String> {
    let marker = format!("id=\"{}\"", escape_html(container_id));
    let opened = page
        .find(&marker)
        .ok_or_else(|| ExplorerError::ProcessingError {
            message: format!("container '{}' not found in page", container_id),
        })?;
    let closed = page[opened..]
        .find("</select>")
        .ok_or_else(|| ExplorerError::ProcessingError {
            message: format!("container '{}' is never closed", container_id),
        })?
        + opened;

    let mut out = String::with_capacity(page.len() + fragment.len());
    out.push_str(&page[..closed]);
    out.push_str(fragment);
    out.push_str(&page[closed..]);
    Ok(out)
}
