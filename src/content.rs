use serde::Serialize;

use crate::games::GameKind;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GameInfo {
    pub kind: GameKind,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub skills: &'static [&'static str],
    pub duration: &'static str,
}

pub const GAMES: &[GameInfo] = &[
    GameInfo {
        kind: GameKind::Memory,
        name: "Memoria de Parejas",
        icon: "🃏",
        description: "Encuentra las parejas de cartas iguales",
        skills: &["Memoria Visual", "Concentración"],
        duration: "5-10 min",
    },
    GameInfo {
        kind: GameKind::Sequence,
        name: "Secuencia de Colores",
        icon: "🎨",
        description: "Memoriza y repite la secuencia de colores",
        skills: &["Memoria de Trabajo", "Atención"],
        duration: "5-8 min",
    },
    GameInfo {
        kind: GameKind::WordSearch,
        name: "Sopa de Letras",
        icon: "🔤",
        description: "Encuentra las palabras escondidas",
        skills: &["Atención", "Lenguaje"],
        duration: "8-12 min",
    },
    GameInfo {
        kind: GameKind::Pattern,
        name: "Patrones Lógicos",
        icon: "🧩",
        description: "Completa los patrones de figuras",
        skills: &["Razonamiento", "Lógica"],
        duration: "6-10 min",
    },
    GameInfo {
        kind: GameKind::MathSpeed,
        name: "Matemática Rápida",
        icon: "⚡",
        description: "Resuelve operaciones contra el tiempo",
        skills: &["Cálculo Mental", "Control de Impulsos"],
        duration: "5-7 min",
    },
];

pub fn game(kind: GameKind) -> Option<&'static GameInfo> {
    GAMES.iter().find(|g| g.kind == kind)
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Subject {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub faq: &'static [Faq],
}

pub const DEFAULT_SUBJECT: &str = "matematica";

pub const SUBJECTS: &[Subject] = &[
    Subject {
        id: "matematica",
        name: "Matemática",
        icon: "🔢",
        description: "Números, operaciones y problemas lógicos",
        faq: &[
            Faq {
                question: "¿Qué son los números?",
                answer: "Los números son símbolos que usamos para contar, medir y ordenar cosas. Los usamos todos los días para saber cuántos juguetes tenemos o qué edad tenemos.",
            },
            Faq {
                question: "¿Para qué sirve sumar?",
                answer: "Sumar sirve para juntar cantidades. Si tienes 3 manzanas y te dan 2 más, sumas 3 + 2 = 5 manzanas en total.",
            },
            Faq {
                question: "¿Qué es restar?",
                answer: "Restar es quitar una cantidad de otra. Si tienes 10 dulces y comes 3, restas 10 - 3 = 7 dulces que te quedan.",
            },
            Faq {
                question: "¿Qué es multiplicar?",
                answer: "Multiplicar es sumar el mismo número varias veces de forma rápida. 3 × 4 es sumar 3 cuatro veces: 3 + 3 + 3 + 3 = 12.",
            },
        ],
    },
    Subject {
        id: "lenguaje",
        name: "Lenguaje",
        icon: "📖",
        description: "Lectura, escritura y comprensión",
        faq: &[
            Faq {
                question: "¿Qué es el lenguaje?",
                answer: "El lenguaje es la forma en que nos comunicamos con otras personas. Usamos palabras habladas, escritas o señas para expresar lo que pensamos y sentimos.",
            },
            Faq {
                question: "¿Qué son las vocales?",
                answer: "Las vocales son 5 letras especiales: A, E, I, O, U. Todas las palabras en español tienen al menos una vocal.",
            },
            Faq {
                question: "¿Qué son las consonantes?",
                answer: "Las consonantes son las letras del abecedario que no son vocales, como B, C, D o M. Se combinan con las vocales para formar palabras.",
            },
        ],
    },
    Subject {
        id: "ciencias",
        name: "Ciencias",
        icon: "🔬",
        description: "Naturaleza, cuerpo humano y experimentos",
        faq: &[
            Faq {
                question: "¿Qué es la ciencia?",
                answer: "La ciencia es la forma en que estudiamos el mundo que nos rodea. Los científicos hacen preguntas, observan y experimentan para descubrir cómo funcionan las cosas.",
            },
            Faq {
                question: "¿Qué necesitan las plantas para vivir?",
                answer: "Las plantas necesitan luz del sol, agua, aire y tierra con nutrientes. Sin estas cosas no pueden crecer fuertes.",
            },
            Faq {
                question: "¿Cuántos planetas hay en el sistema solar?",
                answer: "Hay 8 planetas que giran alrededor del Sol: Mercurio, Venus, Tierra, Marte, Júpiter, Saturno, Urano y Neptuno.",
            },
        ],
    },
    Subject {
        id: "sociales",
        name: "Estudios Sociales",
        icon: "🌍",
        description: "Historia, geografía y cultura",
        faq: &[
            Faq {
                question: "¿Qué son los estudios sociales?",
                answer: "Los estudios sociales nos enseñan sobre las personas, nuestra historia, los países del mundo y cómo nos organizamos en comunidades.",
            },
            Faq {
                question: "¿Cuántos continentes hay en el mundo?",
                answer: "Hay 7 continentes: África, América del Norte, América del Sur, Antártida, Asia, Europa y Oceanía.",
            },
            Faq {
                question: "¿Qué es un país?",
                answer: "Un país es un territorio con sus propias leyes, gobierno, bandera y fronteras. México, España y Colombia son países diferentes.",
            },
        ],
    },
];

pub fn subject(id: &str) -> Option<&'static Subject> {
    let id = id.trim().to_lowercase();
    SUBJECTS.iter().find(|s| s.id == id)
}

/// Unknown ids fall back to mathematics.
pub fn subject_or_default(id: &str) -> &'static Subject {
    subject(id).unwrap_or(&SUBJECTS[0])
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Tip {
    pub title: &'static str,
    pub content: &'static str,
    pub examples: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GuideCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub tips: &'static [Tip],
}

pub const PARENT_GUIDES: &[GuideCategory] = &[
    GuideCategory {
        id: "salud",
        name: "Salud",
        icon: "🏥",
        description: "Cuidado médico y bienestar",
        tips: &[
            Tip {
                title: "Rutina de sueño consistente",
                content: "Los niños con TDAH necesitan entre 9 y 11 horas de sueño. Una rutina estable ayuda a regular su energía durante el día.",
                examples: &[
                    "Establecer la misma hora para dormir todos los días",
                    "Evitar pantallas al menos 1 hora antes de acostarse",
                ],
            },
            Tip {
                title: "Actividad física diaria",
                content: "El ejercicio regular ayuda a liberar energía y aumentar la concentración.",
                examples: &[
                    "Al menos 60 minutos de actividad física al día",
                    "Pausas activas cada 30-45 minutos durante el estudio",
                ],
            },
        ],
    },
    GuideCategory {
        id: "hogar",
        name: "Hogar",
        icon: "🏠",
        description: "Organización y ambiente familiar",
        tips: &[
            Tip {
                title: "Establecer rutinas visuales",
                content: "Las rutinas claras y visuales ayudan a los niños a saber qué esperar y reducen la resistencia.",
                examples: &[
                    "Crear un tablero visual con la rutina diaria",
                    "Usar temporizadores visuales para transiciones",
                ],
            },
            Tip {
                title: "Sistema de recompensas positivo",
                content: "El refuerzo positivo inmediato es más efectivo que los castigos.",
                examples: &[
                    "Tabla de puntos o estrellas por comportamientos positivos",
                    "Elogios específicos y recompensas pequeñas e inmediatas",
                ],
            },
        ],
    },
    GuideCategory {
        id: "escuela",
        name: "Escuela",
        icon: "🎓",
        description: "Apoyo académico y comunicación",
        tips: &[
            Tip {
                title: "Comunicación constante con maestros",
                content: "Una relación colaborativa con la escuela es fundamental para el éxito académico.",
                examples: &[
                    "Reuniones regulares con maestros",
                    "Compartir estrategias que funcionan en casa",
                ],
            },
            Tip {
                title: "Técnicas de estudio efectivas",
                content: "Métodos de estudio adaptados a su estilo de aprendizaje.",
                examples: &[
                    "Sesiones cortas de estudio (20-30 minutos) con descansos",
                    "Usar colores, dibujos y mapas mentales",
                ],
            },
        ],
    },
];

pub fn guide(id: &str) -> Option<&'static GuideCategory> {
    let id = id.trim().to_lowercase();
    PARENT_GUIDES.iter().find(|g| g.id == id)
}
