use crate::PartId;
use rand::Rng;

/// Mint a catalog part id: the template id plus a v4-format UUID drawn from
/// the seeded RNG, so a catalog draw is reproducible from its seed.
pub fn mint_part_id(template_id: &str, rng: &mut impl Rng) -> PartId {
    let bytes: [u8; 16] = rng.gen();
    let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
    PartId(format!("{template_id}_{uuid}"))
}
