/// Keywords that indicate the article is not about the premium automotive
/// world (crime blotter, celebrity gossip, unrelated business news, and
/// known false positives around brand names).
const EXCLUDE_KEYWORDS: &[&str] = &[
    // People with car brand names
    "juju ferrari",
    "juju",
    "puerpério",
    "maternidade",
    "gravidez",
    "grávida",
    // Crime/Police news
    "roubo",
    "assalto",
    "furto",
    "golpe",
    "polícia",
    "pm ",
    "policial",
    "suspeito",
    "morre",
    "morte",
    "baleado",
    "tiro",
    "crime",
    "criminoso",
    "preso",
    "prisão",
    "despejo",
    "aluguel",
    "alugueis",
    // Medical/Beauty
    "silicone",
    "cirurgia",
    "plástica",
    "estética",
    // Politics/Business unrelated
    "cfo ",
    "vice-presidente",
    "americanas",
    // Other false positives
    "tronco",
    "praça",
    "homenagem",
    "político",
];

/// Strong premium/performance/market signals. Any of these overrides an
/// exclusion hit, so a legitimate story that happens to mention an excluded
/// term in passing still survives.
const CONFIRM_KEYWORDS: &[&str] = &[
    "museu",
    "exposição",
    "leilão",
    "milhões",
    "modelo",
    "motor",
    "cv",
    "hp",
    "cavalos",
    "velocidade",
    "km/h",
    "mph",
    "lançamento",
    "novo modelo",
    "test drive",
    "avaliação",
    "review",
    "showroom",
    "concessionária",
    "vendas",
    "mercado automotivo",
    "f40",
    "f50",
    "sf90",
    "812",
    "296",
    "huracan",
    "aventador",
    "urus",
    "911",
    "cayenne",
    "taycan",
    "panamera",
    "macan",
    "automóvel",
    "veículo",
    "carro",
    "esportivo",
    "superesportivo",
];

/// Cheap keyword gate run before any paid AI call. Returns true when the
/// candidate should be dropped.
pub fn should_exclude(title: &str, description: &str) -> bool {
    let text = format!("{} {}", title, description).to_lowercase();

    for keyword in EXCLUDE_KEYWORDS {
        if text.contains(keyword) {
            let confirmed = CONFIRM_KEYWORDS.iter().any(|k| text.contains(k));
            if !confirmed {
                return true;
            }
        }
    }

    false
}
