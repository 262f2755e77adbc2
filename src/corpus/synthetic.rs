//! Seeded synthetic corpus for the default French document categories.
//!
//! Each category has a list of keyword groups (synonyms or variants of one
//! concept). An example picks 5 to 10 groups at random, takes one keyword
//! from each, shuffles them and joins them with spaces.

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};

use crate::corpus::LabeledExample;

type KeywordGroups = &'static [&'static [&'static str]];

const FACTURE: KeywordGroups = &[
    &["FACTURE", "facture", "INVOICE", "Facture N°", "Facture numéro", "FACTURE N°"],
    &["montant", "total", "somme", "prix", "coût", "Total TTC", "Total HT", "Montant dû"],
    &["EUR", "euros", "€", "EURO"],
    &["TVA", "taxe", "T.V.A", "TVA 20%", "TVA applicable"],
    &["Date", "émission", "Date d'émission", "DATE"],
    &["Client", "Destinataire", "À l'attention de", "DESTINATAIRE"],
    &["Référence", "REF", "Numéro", "N°", "Ref"],
    &["Échéance", "Date limite", "Paiement", "À payer avant"],
    &["Prestations", "Services", "Produits", "Articles"],
    &["HT", "hors taxe", "Hors taxes", "Prix HT"],
    &["Quantité", "Qté", "QTE", "Nombre"],
    &["Prix unitaire", "P.U", "Tarif unitaire"],
    &["Société", "Entreprise", "SARL", "SAS", "EURL"],
    &["SIRET", "SIREN", "TVA intracommunautaire"],
    &["Avoir", "Remboursement", "Crédit", "Note de crédit"],
    &["Proforma", "Devis", "Bon de commande"],
    &["Règlement", "Mode de paiement", "Paiement par", "Modalités"],
    &["Virement", "Chèque", "Espèces", "Carte bancaire"],
];

const CV: KeywordGroups = &[
    &["CV", "Curriculum Vitae", "CURRICULUM VITAE", "Curriculum vitae"],
    &["Expérience professionnelle", "Parcours professionnel", "Expériences", "Emplois"],
    &["Formation", "Diplômes", "Études", "Parcours académique"],
    &["Compétences", "Savoir-faire", "Aptitudes", "Qualifications"],
    &["Langues", "Langue maternelle", "Langues parlées"],
    &["Développeur", "Ingénieur", "Chef de projet", "Manager", "Consultant"],
    &["Python", "Java", "JavaScript", "C++", "PHP"],
    &["Master", "Licence", "Doctorat", "Bachelor", "Ingénieur"],
    &["Années d'expérience", "ans d'expérience", "Expérience de"],
    &["Références", "Recommandations", "Contacts"],
    &["Objectif professionnel", "Projet professionnel", "Objectif"],
    &["Portfolio", "Réalisations", "Projets"],
    &["Autonomie", "Rigueur", "Dynamique", "Esprit d'équipe"],
    &["Stage", "Alternance", "CDD", "CDI"],
    &["Poste actuel", "Poste recherché", "Disponibilité"],
];

const CONTRAT: KeywordGroups = &[
    &["Contrat", "CONTRAT", "Convention", "Accord"],
    &["CDI", "CDD", "Contrat à durée indéterminée", "Contrat à durée déterminée"],
    &["Parties", "Entre", "Soussigné", "Signataires"],
    &["Article", "Clause", "Stipulation", "Disposition"],
    &["Durée", "Période", "Terme", "Échéance"],
    &["Rémunération", "Salaire", "Montant", "Honoraires"],
    &["Obligations", "Engagements", "Devoirs", "Responsabilités"],
    &["Résiliation", "Rupture", "Terme", "Fin"],
    &["Préavis", "Délai", "Notice"],
    &["Confidentialité", "Secret", "Non-divulgation", "NDA"],
    &["Propriété intellectuelle", "Droits d'auteur", "Brevets"],
    &["Litige", "Différend", "Arbitrage", "Juridiction"],
    &["Signature", "Fait à", "Date", "Lu et approuvé"],
    &["Employeur", "Salarié", "Entreprise", "Société"],
    &["Mission", "Fonction", "Poste", "Travail"],
];

const LETTRE: KeywordGroups = &[
    &["Lettre", "Courrier", "Correspondance"],
    &["Madame", "Monsieur", "Madame, Monsieur"],
    &["Objet", "Concerne", "Référence"],
    &["Motivation", "Candidature", "Postule"],
    &["Veuillez agréer", "Cordialement", "Salutations", "Bien à vous"],
    &["Recommandation", "Attestation", "Certificat"],
    &["Démission", "Départ", "Quitter"],
    &["Réclamation", "Contestation", "Plainte"],
    &["Sollicite", "Demande", "Souhaite"],
    &["À l'attention de", "Destinataire", "Pour"],
    &["Mise en demeure", "Sommation", "Avertissement"],
    &["Remerciements", "Gratitude", "Reconnaissance"],
    &["Regrets", "Excuses", "Désolé"],
    &["Invitation", "Convier", "Plaisir"],
    &["Formule de politesse", "Respectueusement"],
];

const AUTRE: KeywordGroups = &[
    &["Notice", "Mode d'emploi", "Instructions", "Manuel"],
    &["Rapport", "Compte rendu", "Bilan", "Analyse"],
    &["Menu", "Carte", "Plats", "Entrées", "Desserts"],
    &["Programme", "Planning", "Calendrier", "Horaires"],
    &["Catalogue", "Brochure", "Prospectus"],
    &["Formulaire", "Questionnaire", "Fiche"],
    &["Certificat médical", "Ordonnance", "Prescription"],
    &["Bulletin", "Relevé", "État"],
    &["Article", "Blog", "Publication", "Post"],
    &["Recette", "Cuisine", "Ingrédients", "Préparation"],
    &["Fiche technique", "Spécifications", "Caractéristiques"],
    &["Attestation", "Justificatif", "Preuve"],
];

const CATEGORIES: &[(&str, KeywordGroups)] = &[
    ("Facture", FACTURE),
    ("CV", CV),
    ("Contrat", CONTRAT),
    ("Lettre", LETTRE),
    ("Autre", AUTRE),
];

/// Names of the built-in categories, in generation order.
pub fn default_categories() -> Vec<&'static str> {
    CATEGORIES.iter().map(|(name, _)| *name).collect()
}

/// Deterministic generator of keyword-soup documents.
#[derive(Debug)]
pub struct SyntheticGenerator {
    rng: StdRng,
    min_groups: usize,
    max_groups: usize,
}

impl SyntheticGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            min_groups: 5,
            max_groups: 10,
        }
    }

    /// `per_category` examples for each built-in category, grouped by
    /// category in [`default_categories`] order.
    pub fn generate(&mut self, per_category: usize) -> Vec<LabeledExample> {
        let mut examples = Vec::with_capacity(per_category * CATEGORIES.len());
        for (category, groups) in CATEGORIES {
            for _ in 0..per_category {
                let text = self.sample_text(groups);
                examples.push(LabeledExample::new(text, *category));
            }
        }
        examples
    }

    /// Like [`generate`](Self::generate), with the categories interleaved
    /// in random order.
    pub fn generate_shuffled(&mut self, per_category: usize) -> Vec<LabeledExample> {
        let mut examples = self.generate(per_category);
        examples.shuffle(&mut self.rng);
        examples
    }

    fn sample_text(&mut self, groups: KeywordGroups) -> String {
        let n_groups = self.rng.random_range(self.min_groups..=self.max_groups);
        let mut parts: Vec<&str> = groups
            .choose_multiple(&mut self.rng, n_groups)
            .filter_map(|group| group.choose(&mut self.rng).copied())
            .collect();
        parts.shuffle(&mut self.rng);
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_categories() {
        let examples = SyntheticGenerator::new(42).generate(10);
        assert_eq!(examples.len(), 50);
        for name in default_categories() {
            assert_eq!(examples.iter().filter(|e| e.category == name).count(), 10);
        }
    }

    #[test]
    fn test_texts_use_five_to_ten_keywords() {
        let examples = SyntheticGenerator::new(1).generate(20);
        for example in &examples {
            assert!(!example.text.is_empty());
            let groups = CATEGORIES
                .iter()
                .find(|(name, _)| *name == example.category)
                .map(|(_, g)| *g)
                .unwrap();
            let hits = groups
                .iter()
                .filter(|group| group.iter().any(|kw| example.text.contains(kw)))
                .count();
            assert!(hits >= 5, "{}", example.text);
        }
    }

    #[test]
    fn test_same_seed_same_corpus() {
        let a = SyntheticGenerator::new(9).generate_shuffled(5);
        let b = SyntheticGenerator::new(9).generate_shuffled(5);
        assert_eq!(a, b);
        assert_ne!(a, SyntheticGenerator::new(10).generate_shuffled(5));
    }
}
