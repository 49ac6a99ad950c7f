//! Localized terminal rendering of view-states

use std::fmt::Write as _;

use colored::Colorize;

use crate::action::{DeletedPost, LoginOutcome, LogoutOutcome, ViewState};
use crate::blog::BlogPost;
use crate::flow::{
    AnalyzeSymptomsOutput, FindDoctorsOutput, FindHospitalsOutput, FindPathologyLabsOutput,
    FindPharmaciesOutput,
};
use crate::form::FORM_ERRORS;
use crate::i18n::{Catalog, Language, MessageId};
use crate::links::NearbyLink;

/// Output that can be shown in the terminal
pub trait Render {
    fn render(&self, catalog: &Catalog, lang: Language) -> String;
}

/// Message, then output or errors
pub fn render_state<T: Render>(state: &ViewState<T>, catalog: &Catalog, lang: Language) -> String {
    let mut out = String::new();

    if let Some(message) = &state.message {
        let text = catalog.translate(message, lang);
        if state.is_success() {
            let _ = writeln!(out, "{} {}", "✓".green(), text.bold());
        } else {
            let _ = writeln!(out, "{} {}", "✗".red(), text.red().bold());
        }
    }

    if let Some(errors) = &state.errors {
        for (field, messages) in errors {
            for message in messages {
                let text = catalog.translate(message, lang);
                if field == FORM_ERRORS {
                    let _ = writeln!(out, "  {}", text);
                } else {
                    let _ = writeln!(out, "  {} {}", format!("{}:", field).yellow(), text);
                }
            }
        }
    }

    if let Some(output) = &state.output {
        out.push('\n');
        out.push_str(&output.render(catalog, lang));
    }

    out
}

fn heading(out: &mut String, catalog: &Catalog, lang: Language, key: &str) {
    let _ = writeln!(out, "{}", catalog.text(key, lang).cyan().bold());
}

fn labeled(out: &mut String, catalog: &Catalog, lang: Language, key: &str, value: &str) {
    let _ = writeln!(out, "    {} {}", format!("{}:", catalog.text(key, lang)).dimmed(), value);
}

fn disclaimer_block(
    out: &mut String,
    catalog: &Catalog,
    lang: Language,
    disclaimer: &str,
    location: &str,
    specialty: Option<&str>,
) {
    let specialty_string = specialty.map(|s| format!(" ({})", s)).unwrap_or_default();
    let text = catalog.translate(
        &MessageId::new("aiGeneratedDataDisclaimer")
            .with_param("disclaimer", disclaimer)
            .with_param("location", location)
            .with_param("specialtyString", specialty_string),
        lang,
    );
    out.push('\n');
    heading(out, catalog, lang, "disclaimerTitle");
    let _ = writeln!(out, "{}", text.italic());
}

fn no_data(out: &mut String, catalog: &Catalog, lang: Language, entity_key: &str, specialty: Option<&str>) {
    let text = catalog.translate(
        &MessageId::new("noDataGenerated")
            .with_param("entity", catalog.text(entity_key, lang))
            .with_param("specialtyString", specialty.map(|s| format!(" ({})", s)).unwrap_or_default()),
        lang,
    );
    let _ = writeln!(out, "{}", text.yellow());
}

impl Render for AnalyzeSymptomsOutput {
    fn render(&self, catalog: &Catalog, lang: Language) -> String {
        let mut out = String::new();

        heading(&mut out, catalog, lang, "suggestedMedicinesTitle");
        if self.suggested_medicines.is_empty() {
            let _ = writeln!(out, "  {}", catalog.text("noMedicinesSuggested", lang));
        }
        for medicine in &self.suggested_medicines {
            let _ = writeln!(out, "  • {}", medicine.name.bold());
            labeled(&mut out, catalog, lang, "dosageLabel", &medicine.dosage);
        }

        if let Some(specialty) = &self.suggested_specialty {
            out.push('\n');
            heading(&mut out, catalog, lang, "suggestedSpecialtyTitle");
            let _ = writeln!(out, "  {}", specialty);
        }

        if let Some(diet) = &self.suggested_diet_plan {
            out.push('\n');
            heading(&mut out, catalog, lang, "dietPlanTitle");
            let _ = writeln!(out, "  {}", diet);
        }

        out.push('\n');
        heading(&mut out, catalog, lang, "disclaimerTitle");
        let _ = writeln!(out, "{}", self.disclaimer.italic());
        out
    }
}

impl Render for FindPharmaciesOutput {
    fn render(&self, catalog: &Catalog, lang: Language) -> String {
        let mut out = String::new();
        heading(&mut out, catalog, lang, "findPharmacies");
        if self.pharmacies.is_empty() {
            no_data(&mut out, catalog, lang, "findPharmacies", None);
        }
        for pharmacy in &self.pharmacies {
            let _ = writeln!(out, "  • {} - {}", pharmacy.name.bold(), pharmacy.address);
            if let Some(phone) = &pharmacy.phone {
                labeled(&mut out, catalog, lang, "phoneLabel", phone);
            }
            if let Some(hours) = &pharmacy.hours {
                labeled(&mut out, catalog, lang, "hoursLabel", hours);
            }
        }
        disclaimer_block(&mut out, catalog, lang, &self.disclaimer, &self.searched_location, None);
        out
    }
}

impl Render for FindDoctorsOutput {
    fn render(&self, catalog: &Catalog, lang: Language) -> String {
        let mut out = String::new();
        let specialty = self.searched_specialty.as_deref();
        heading(&mut out, catalog, lang, "findDoctors");
        if self.doctors.is_empty() {
            no_data(&mut out, catalog, lang, "findDoctors", specialty);
        }
        for doctor in &self.doctors {
            let _ = writeln!(out, "  • {} - {}", doctor.name.bold(), doctor.address);
            labeled(&mut out, catalog, lang, "specialtyLabel", &doctor.specialty);
            if let Some(phone) = &doctor.phone {
                labeled(&mut out, catalog, lang, "phoneLabel", phone);
            }
        }
        disclaimer_block(&mut out, catalog, lang, &self.disclaimer, &self.searched_location, specialty);
        out
    }
}

impl Render for FindHospitalsOutput {
    fn render(&self, catalog: &Catalog, lang: Language) -> String {
        let mut out = String::new();
        heading(&mut out, catalog, lang, "findHospitals");
        if self.hospitals.is_empty() {
            no_data(&mut out, catalog, lang, "findHospitals", None);
        }
        for hospital in &self.hospitals {
            let _ = writeln!(out, "  • {} - {}", hospital.name.bold(), hospital.address);
            if let Some(phone) = &hospital.phone {
                labeled(&mut out, catalog, lang, "phoneLabel", phone);
            }
            if let Some(rating) = hospital.rating {
                labeled(&mut out, catalog, lang, "ratingLabel", &format!("{:.1}/5", rating));
            }
            if let Some(specialties) = hospital.specialties.as_ref().filter(|s| !s.is_empty()) {
                labeled(&mut out, catalog, lang, "specialtiesLabel", &specialties.join(", "));
            }
        }
        disclaimer_block(&mut out, catalog, lang, &self.disclaimer, &self.searched_location, None);
        out
    }
}

impl Render for FindPathologyLabsOutput {
    fn render(&self, catalog: &Catalog, lang: Language) -> String {
        let mut out = String::new();
        heading(&mut out, catalog, lang, "findPathologyLabs");
        if self.labs.is_empty() {
            no_data(&mut out, catalog, lang, "findPathologyLabs", None);
        }
        for lab in &self.labs {
            let _ = writeln!(out, "  • {} - {}", lab.name.bold(), lab.address);
            if let Some(phone) = &lab.phone {
                labeled(&mut out, catalog, lang, "phoneLabel", phone);
            }
            if let Some(hours) = &lab.operating_hours {
                labeled(&mut out, catalog, lang, "hoursLabel", hours);
            }
            if let Some(services) = lab.services_offered.as_ref().filter(|s| !s.is_empty()) {
                labeled(&mut out, catalog, lang, "servicesLabel", &services.join(", "));
            }
        }
        disclaimer_block(&mut out, catalog, lang, &self.disclaimer, &self.searched_location, None);
        out
    }
}

impl Render for BlogPost {
    fn render(&self, _catalog: &Catalog, _lang: Language) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title.bold());
        let _ = writeln!(
            out,
            "{}",
            format!("{} · {} · /blog/{}", self.author, self.date.format("%Y-%m-%d"), self.slug).dimmed()
        );
        let _ = writeln!(out, "{}", format!("id: {}", self.id).dimmed());
        out.push('\n');
        let _ = writeln!(out, "{}", self.content);
        out
    }
}

impl Render for LoginOutcome {
    fn render(&self, _catalog: &Catalog, _lang: Language) -> String {
        format!("{}\n{} {}\n", self.token, "→".cyan(), self.redirect_to)
    }
}

impl Render for LogoutOutcome {
    fn render(&self, _catalog: &Catalog, _lang: Language) -> String {
        format!("{} {}\n", "→".cyan(), self.redirect_to)
    }
}

impl Render for DeletedPost {
    fn render(&self, _catalog: &Catalog, _lang: Language) -> String {
        format!("{}\n", self.id.dimmed())
    }
}

/// One line per post, newest first
pub fn render_post_list(posts: &[BlogPost]) -> String {
    let mut out = String::new();
    for post in posts {
        let _ = writeln!(
            out,
            "{}  {}  {}",
            post.date.format("%Y-%m-%d").to_string().dimmed(),
            post.slug.cyan(),
            post.title
        );
        if let Some(excerpt) = &post.excerpt {
            let _ = writeln!(out, "            {}", excerpt.dimmed());
        }
    }
    out
}

pub fn render_links(links: &[NearbyLink], catalog: &Catalog, lang: Language) -> String {
    let mut out = String::new();
    heading(&mut out, catalog, lang, "nearbyServicesTitle");
    for link in links {
        let _ = writeln!(
            out,
            "  • {:<16} {}",
            catalog.text(link.kind.title_key(), lang),
            link.url.as_str().underline()
        );
    }
    let _ = writeln!(out, "\n{}", catalog.text("nearbyServicesNote", lang).dimmed());
    out
}
