use crate::models::Category;

const F1_KEYWORDS: &[&str] = &[
    "formula 1",
    "f1",
    "grand prix",
    "gp ",
    "verstappen",
    "hamilton",
    "ferrari f1",
    "mclaren f1",
    "red bull racing",
    "fia",
    "pole position",
    "pit stop",
    "corrida de f1",
    "campeonato de f1",
];

const PREMIUM_KEYWORDS: &[&str] = &[
    "ferrari",
    "lamborghini",
    "porsche",
    "mclaren",
    "aston martin",
    "bentley",
    "rolls-royce",
    "bugatti",
    "pagani",
    "koenigsegg",
    "supercar",
    "hypercar",
    "luxury car",
    "carro de luxo",
    "esportivo",
    "supercarro",
];

/// Ordered keyword classification over lowercased title+description.
/// F1 keywords are checked first (more specific), so a story mentioning
/// both a race and a marque lands in the F1 bucket. Everything else
/// defaults to the premium-market bucket; off-topic articles were already
/// removed by the filter and validator stages.
pub fn classify(title: &str, description: &str) -> Category {
    let text = format!("{} {}", title, description).to_lowercase();

    for keyword in F1_KEYWORDS {
        if text.contains(keyword) {
            return Category::Formula1;
        }
    }

    for keyword in PREMIUM_KEYWORDS {
        if text.contains(keyword) {
            return Category::PremiumMarket;
        }
    }

    Category::PremiumMarket
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f1_story_is_flagship() {
        assert_eq!(
            classify("Verstappen domina treino livre", "Pole position em jogo"),
            Category::Formula1
        );
    }

    #[test]
    fn marque_story_is_premium() {
        assert_eq!(
            classify("Lamborghini revela edição limitada", "Apenas 40 unidades"),
            Category::PremiumMarket
        );
    }

    #[test]
    fn f1_wins_when_both_match() {
        assert_eq!(
            classify(
                "Grand Prix de Mônaco atrai colecionadores",
                "Ferrari e relógios de luxo nos paddocks"
            ),
            Category::Formula1
        );
    }

    #[test]
    fn unmatched_story_defaults_to_premium() {
        assert_eq!(
            classify("Mercado de veículos exclusivos cresce", "Importações em alta"),
            Category::PremiumMarket
        );
    }
}
