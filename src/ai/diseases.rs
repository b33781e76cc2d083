use serde::Serialize;

/// Reference card shown next to a prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiseaseInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub symptoms: &'static str,
    pub treatment: &'static str,
    pub prevention: &'static str,
    pub severity: &'static str,
}

pub const AVAILABLE_DISEASES_HINT: &str =
    "Available diseases: healthy, coccidiosis, salmonella, e_coli, newcastle";

/// Keyed by the classifier's label
pub static DISEASES: [(&str, DiseaseInfo); 5] = [
    (
        "healthy",
        DiseaseInfo {
            name: "Healthy",
            description: "Normal, healthy chicken droppings",
            symptoms: "Firm, brown droppings with white urates",
            treatment: "Continue good hygiene and regular monitoring",
            prevention: "Maintain clean environment, fresh water, and proper nutrition",
            severity: "None",
        },
    ),
    (
        "coccidiosis",
        DiseaseInfo {
            name: "Coccidiosis",
            description: "Parasitic infection affecting the intestinal tract",
            symptoms: "Bloody or watery droppings, lethargy, poor growth",
            treatment: "Anticoccidial medication, supportive care",
            prevention: "Keep environment dry, avoid overcrowding, use medicated feed",
            severity: "Moderate to High",
        },
    ),
    (
        "salmonella",
        DiseaseInfo {
            name: "Salmonella",
            description: "Bacterial infection that can affect digestive system",
            symptoms: "Watery droppings, decreased appetite, lethargy",
            treatment: "Antibiotics (consult veterinarian), supportive care",
            prevention: "Good hygiene, clean water, proper feed storage",
            severity: "Moderate",
        },
    ),
    (
        "e_coli",
        DiseaseInfo {
            name: "E. Coli Infection",
            description: "Bacterial infection often secondary to other conditions",
            symptoms: "Watery droppings, depression, poor growth",
            treatment: "Antibiotics, improve environmental conditions",
            prevention: "Clean environment, good ventilation, stress reduction",
            severity: "Moderate",
        },
    ),
    (
        "newcastle",
        DiseaseInfo {
            name: "Newcastle Disease",
            description: "Viral disease affecting respiratory and nervous systems",
            symptoms: "Greenish droppings, respiratory distress, neurological signs",
            treatment: "Supportive care (no specific treatment), isolation",
            prevention: "Vaccination, biosecurity measures, quarantine new birds",
            severity: "High",
        },
    ),
];

pub fn lookup(label: &str) -> Option<&'static DiseaseInfo> {
    DISEASES
        .iter()
        .find(|(key, _)| *key == label)
        .map(|(_, info)| info)
}
