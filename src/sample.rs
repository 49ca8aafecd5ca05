use crate::models::Review;

/// Booking.com reviews of a Rome hotel, used when no input file is given.
const SAMPLE: &[(&str, Option<&str>, Option<&str>)] = &[
    (
        "Consigliatissimo!!!",
        Some("Struttura elegante super accogliente collegata al centro con un ottimo servizio di navetta. Personale affabile e disponibile. Colazione eccellente, dolce e salata. Il ristorante sulla terrazza mozzafiato da provare. Palestra attrezzata, wellness ottimo e ampia piscina. Consigliatissimo!"),
        Some("Nulla, tutto perfetto!"),
    ),
    (
        "Uno dei posti preferiti in Roma",
        Some("Stanza e piscina e il personale della reception, specialmente la professionalità e la cortesia di un membro femminile di cui mi dispiace nn saper e il nome per essersi presa in carico un piccolo problema che avevo avuto durante il soggiorno."),
        Some("Un po' meno la colazione"),
    ),
    (
        "Bellissimo",
        Some("Tutto"),
        Some("Il letto era troppo piccolo e rumoroso"),
    ),
    (
        "Eccellente",
        Some("Servizio eccezionale, staff gentilissimo e preparato; Danilo dell'accoglienza ha saputo metterci a nostro agio, con piccole accortezze ha dimostrato professionalità nonostante l'albergo fosse sold out ci ha dedicato minuti preziosi. Colazione di alto livello, tanta scelta, eccellente qualità."),
        None,
    ),
    (
        "Eccezionale",
        Some("Pulizia delle stanze ottimale, personale gentile e accogliente"),
        None,
    ),
    (
        "uno dei miei alberghi preferiti a Roma",
        Some("camere ampie, moderne ed eleganti, con letti comodi, balcone con vista sulla valle dei Casali, bellissima piscina, parcheggio, campi da Padel raggiungibili a piedi, a pochi metri Villa Pamphili (il parco più' grande e più bello di Roma), buona colazione, bella terrazza panoramica sul tetto, ottimi cocktails al Bar, bei divani e bei cuscini sulle terrazze in un giardino molto ben tenuto"),
        Some("A Luglio la piscina e' un po' affollata, limiterei l'accesso dall'esterno, inoltre la musica dovrebbe essere più rilassante e più di sottofondo, la colazione, molto completa andrebbe organizzata meglio, il ristorante vista la posizione, dovrebbe essere migliorato, (con queste correzioni raggiungerebbe il 10)"),
    ),
    (
        "Soggiorno piacevole, hotel accogliente con piscina fantastica. Percorso alle fermate difficoltoso.",
        Some("Struttura con molti servizi: piscina eccezionale, spa piacevole, colazione varia ed abbondante. Camera insonorizzata, pulita, moderna, con condizionatore e con ampio terrazzo. Posizione vicino ad un grande parco pubblico. Inquinamento acustico assente. Contest fotografico con in palio due pernottamenti gratis. Sensibilità ambientale. Rapporto qualità/prezzo ottimo."),
        Some("Il percorso per raggiungere le fermate del trasporto pubblico è pericoloso (senza marciapiede) e con tratti ripidi (circa 100 metri in salita di cui 50 metri molto ripidi). Spa con alcuni idromassaggi non funzionanti. E' capitato che un pomeriggio dopo le 15.30 non si è potuta usare la piscina."),
    ),
    (
        "Eccezionale",
        Some("È la seconda volta che ci vediamo. Defilato dal caos romano, ne cuore di villa Pamphili. Tutto perfetto."),
        None,
    ),
    (
        "Eccezionale",
        Some("Staff eccellente."),
        None,
    ),
    (
        "Eccezionale",
        Some("Hotel nuovo e pulitissimo"),
        None,
    ),
    (
        "Soggiorno eccellente",
        Some("Struttura eccellente sotto ogni punto di vista."),
        None,
    ),
    (
        "Eccellente",
        Some("Ottima struttura e personale accogliente e disponibile alle nostre richieste. Camere pulite. Ambiente calmo e rilassante. Buona la posizione per spostarsi in auto verso il centro. Ottima la pizza"),
        Some("Il servizio al tavolo di sera, un po' disorganizzato"),
    ),
    (
        "Fresco nonostante temperature proibitive",
        Some("Un posto incantevole, immerso nel verde e nonostante i 35 gradi la notte si stava freschi al 5^piano senza accendere l'aria condizionata"),
        Some("Il cavo TV non era collegato, ma il tecnico ha risolto subito"),
    ),
    (
        "Ottimo",
        Some("Ci è piaciuto tanto che ha la piscina."),
        None,
    ),
    (
        "Eccezionale",
        Some("La location, i servizi, la qualità del cibo e lo staff sempre presente. È la seconda volta che torniamo e su Roma è il nostro puntò di riferimento."),
        None,
    ),
    (
        "Mi è piaciuto molto tutto",
        Some("Mi è piaciuto molto la posizione, la terrazza con il ristorante, la piscina, il parco, la colazione . La gentilezza e la professionalità del personale."),
        None,
    ),
    (
        "Eccezionale",
        Some("La"),
        None,
    ),
    (
        "Eccezionale",
        Some("Accoglienza, pulizia, stile delle camera, servizi"),
        None,
    ),
    (
        "Eccezionale!",
        Some("Struttura bella, elegante, pulita e organizzata."),
        None,
    ),
];

pub fn sample_reviews() -> Vec<Review> {
    SAMPLE
        .iter()
        .map(|(title, pos, neg)| Review::new(*title, *pos, *neg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_corpus_shape() {
        let reviews = sample_reviews();
        assert_eq!(reviews.len(), 19);
        assert_eq!(reviews[13].title, "Ottimo");
        assert_eq!(
            reviews[13].positive_text.as_deref(),
            Some("Ci è piaciuto tanto che ha la piscina.")
        );
        assert!(reviews[13].negative_text.is_none());
    }
}
